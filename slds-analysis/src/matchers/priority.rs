//! Prioritized replacements: BEM class spellings and density tokens

use super::classes::{self, Occurrence};
use super::declaration::match_style;
use super::{validated_styles, Matcher};
use crate::catalog::{DesignToken, RuleTable, TokenType};
use crate::context::{Context, ContextKey};
use crate::model::{Action, Item, Recommendation};
use slds_parser::{Bundle, Entry, Input, InputKind};

pub struct PriorityMatcher {
    bem: Vec<DesignToken>,
    density: Vec<DesignToken>,
}

impl PriorityMatcher {
    pub fn new(rules: &RuleTable) -> Self {
        let (bem, density): (Vec<_>, Vec<_>) =
            rules.priorities.iter().partition(|rule| rule.is_bem());
        Self {
            bem: bem.into_iter().flat_map(|rule| rule.design_tokens()).collect(),
            density: density
                .into_iter()
                .flat_map(|rule| rule.design_tokens())
                .collect(),
        }
    }

    fn tokens(&self, context: &Context) -> Vec<&DesignToken> {
        let mut tokens = Vec::new();
        if context.is_enabled(ContextKey::Bem) {
            tokens.extend(&self.bem);
        }
        if context.is_enabled(ContextKey::Density) {
            tokens.extend(&self.density);
        }
        tokens
    }
}

/// One item per replaced class, with an action per place it is written.
fn match_classes(
    occurrences: &[Occurrence],
    tokens: &[&DesignToken],
    kind: InputKind,
) -> Vec<Item> {
    let spellings = classes::by_spelling(occurrences);
    tokens
        .iter()
        .filter(|token| token.token_type == TokenType::Utility)
        .filter_map(|token| {
            let found = spellings.get(&token.value)?;
            let actions = found.iter().map(|occurrence| {
                Action::replace(&token.name, &token.name, occurrence.range).with_file_type(kind)
            });
            Some(Item::with_actions(found[0].name.trim(), actions))
        })
        .collect()
}

impl Matcher for PriorityMatcher {
    fn name(&self) -> &str {
        "priority"
    }

    fn matches(&self, entry: &Entry, _bundle: &Bundle, context: &Context) -> Vec<Recommendation> {
        let tokens = self.tokens(context);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut result = Vec::new();
        for input in &entry.inputs {
            match input {
                Input::RuleSet(rule) => result.extend(validated_styles(rule).filter_map(|style| {
                    match_style(style, tokens.iter().copied(), entry.entity_type)
                })),
                Input::HtmlElement(element) if element.attribute("class").is_some() => {
                    let items = match_classes(
                        &classes::element_classes(element),
                        &tokens,
                        InputKind::HtmlElement,
                    );
                    if !items.is_empty() {
                        result.push(Recommendation::new(element.clone(), items));
                    }
                }
                Input::Block(block) => {
                    let items =
                        match_classes(&classes::script_classes(block), &tokens, InputKind::Block);
                    if !items.is_empty() {
                        result.push(Recommendation::new(block.clone(), items));
                    }
                }
                Input::HtmlElement(_) | Input::Style(_) => {}
            }
        }
        tracing::debug!(path = %entry.path.display(), found = result.len(), "priority matcher");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use slds_parser::Range;

    fn run(file_name: &str, source: &str, disabled: &[&str]) -> Vec<Recommendation> {
        let bundle = testing::bundle(&[(file_name, source)]);
        PriorityMatcher::new(&testing::rules()).matches(
            &bundle.entries()[0],
            &bundle,
            &Context::with_disabled(disabled),
        )
    }

    #[test]
    fn test_bem_modifier_in_markup() {
        let found = run(
            "card.html",
            "<template>\n  <button class=\"slds-button slds-button--brand\">Go</button>\n</template>",
            &[],
        );
        assert_eq!(found.len(), 1);
        let item = found[0].items.iter().next().unwrap();
        assert_eq!(item.value, "slds-button--brand");
        let action = item.actions.iter().next().unwrap();
        assert_eq!(action.name, "slds-button_brand");
        assert_eq!(action.value.as_deref(), Some("slds-button_brand"));
        assert_eq!(action.range, Range::on_line(1, 29, 47));
    }

    #[test]
    fn test_bem_modifier_in_script() {
        let source = "export default class Card {\n  get css() { return 'slds-box--small'; }\n}";
        let found = run("card.js", source, &[]);
        assert_eq!(found.len(), 1);
        let action = found[0].actions().next().unwrap();
        assert_eq!(action.name, "slds-box_small");
        assert_eq!(action.file_type, Some(InputKind::Block));
    }

    #[test]
    fn test_density_in_styles() {
        let found = run("card.css", ":host { padding: 12px; }", &[]);
        let names: Vec<_> = found[0].actions().map(|action| action.name.as_str()).collect();
        assert_eq!(names, vec!["varSpacingHorizontalSmall", "varSpacingVerticalSmall"]);
    }

    #[test]
    fn test_groups_follow_flags() {
        let markup = "<template><div class=\"slds-box--small\"></div></template>";
        assert!(run("card.html", markup, &["BEM"]).is_empty());
        assert!(run("card.css", ":host { padding: 12px; }", &["density"]).is_empty());
        assert!(!run("card.css", ":host { padding: 12px; }", &["BEM"]).is_empty());
    }

    #[test]
    fn test_current_spelling_is_left_alone() {
        let markup = "<template><div class=\"slds-box_small\"></div></template>";
        assert!(run("card.html", markup, &[]).is_empty());
    }
}
