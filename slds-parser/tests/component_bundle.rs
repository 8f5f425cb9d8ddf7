use slds_parser::{AnnotationType, Bundle, EntityType, Entry, Input, Position, Range};

const TEMPLATE: &str = r#"<template>
    <div class="container slds-p-around_small">
        <lightning-button-icon icon-name="utility:close"></lightning-button-icon>
        <template for:each={items} for:item="item">
            <p key={item.id} class="row">{item.label}</p>
        </template>
    </div>
</template>
"#;

const STYLESHEET: &str = r#":host {
    display: block;
}

.container {
    /* sldsValidatorAllow */
    padding: 0.75rem;
    color: #080707;
}

@media (min-width: 48em) {
    .row { font-size: var(--lwc-fontSize3, 0.8125rem); }
}
"#;

const SCRIPT: &str = r#"import { LightningElement, api } from 'lwc';

export default class Cards extends LightningElement {
    @api items;

    hide() {
        this.template.querySelector('.container').classList.add('slds-hide');
    }
}
"#;

fn bundle() -> Bundle {
    Bundle::new(vec![
        Entry::from_source("lwc/cards/cards.html", TEMPLATE),
        Entry::from_source("lwc/cards/cards.css", STYLESHEET),
        Entry::from_source("lwc/cards/cards.js", SCRIPT),
    ])
}

#[test]
fn bundle_is_lwc() {
    let bundle = bundle();
    assert_eq!(bundle.entity_type(), EntityType::Lwc);
    for entry in bundle.entries() {
        assert_eq!(entry.component_name, "cards");
    }
}

#[test]
fn stylesheet_inputs() {
    let bundle = bundle();
    let entry = &bundle.entries()[1];
    let rules: Vec<_> = entry.rule_sets().collect();
    assert_eq!(rules.len(), 3);

    let container = rules[1];
    assert_eq!(container.selectors[0].text, ".container");
    assert_eq!(container.styles[0].annotation, AnnotationType::Allow);
    assert_eq!(container.styles[0].range, Range::on_line(6, 4, 21));
    assert_eq!(container.styles[1].value, "#080707");

    let media = rules[2];
    assert_eq!(media.selectors[0].text, ".row");
    assert_eq!(media.styles[0].value, "var(--lwc-fontSize3, 0.8125rem)");
}

#[test]
fn markup_inputs() {
    let bundle = bundle();
    let entry = &bundle.entries()[0];
    let tags: Vec<_> = entry.elements().map(|element| element.tag.as_str()).collect();
    assert_eq!(
        tags,
        vec!["template", "div", "lightning-button-icon", "template", "p"]
    );

    let div = entry.elements().nth(1).unwrap();
    assert!(div.has_class("slds-p-around_small"));
    assert_eq!(div.classes[1].range, Range::on_line(1, 26, 45));

    let row = entry.elements().nth(4).unwrap();
    let key = row.attribute("key").unwrap();
    assert!(key.computed);
    assert_eq!(key.value.as_deref(), Some("item.id"));
}

#[test]
fn script_inputs() {
    let bundle = bundle();
    let entry = &bundle.entries()[2];
    let blocks: Vec<_> = entry.blocks().collect();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].function_name, "hide");
    assert_eq!(blocks[0].range.start, Position::new(5, 4));
    assert!(matches!(entry.inputs[0], Input::Block(_)));
}

#[test]
fn stylesheet_outline() {
    let bundle = bundle();
    let mut outline = Vec::new();
    for rule in bundle.entries()[1].rule_sets() {
        let selectors: Vec<_> = rule.selectors.iter().map(|selector| selector.text.as_str()).collect();
        outline.push(selectors.join(", "));
        for style in &rule.styles {
            let mut line = format!("  {}: {}", style.property_name(), style.value);
            if style.annotation != AnnotationType::None {
                line.push_str(&format!(" [{:?}]", style.annotation));
            }
            outline.push(line);
        }
    }
    insta::assert_snapshot!(outline.join("\n"), @r###"
    :host
      display: block
    .container
      padding: 0.75rem [Allow]
      color: #080707
    .row
      font-size: var(--lwc-fontSize3, 0.8125rem)
    "###);
}
