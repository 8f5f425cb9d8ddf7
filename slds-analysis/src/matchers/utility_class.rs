//! Rules whose declarations a utility class already provides

use super::selector;
use super::{validated_styles, Matcher};
use crate::catalog::{TokenCatalog, UtilityClass};
use crate::context::{Context, ContextKey};
use crate::model::{Action, Item, Recommendation, RelatedInformation};
use crate::normalizer;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use slds_parser::{Bundle, Entry, HtmlElement, InputKind, Position, Range, RuleSet, Selector, Style};
use std::path::Path;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(?P<name>\w+)").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A utility class reduced to its preferred name and one value pattern per property.
struct Utility {
    name: String,
    settings: Vec<(String, Regex)>,
}

impl Utility {
    /// `None` for names that are not a single class (`slds-grid *`, `a b`).
    fn new(utility: &UtilityClass, catalog: &dyn TokenCatalog) -> Option<Self> {
        let names: Vec<&str> = utility.names().collect();
        let preferred: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| !(name.contains("--") && names.contains(&name.replace("--", "_").as_str())))
            .collect();
        let name = preferred.join(",");
        if name.is_empty() || name.contains(' ') || name.contains('*') {
            return None;
        }

        let settings = utility
            .settings
            .iter()
            .map(|setting| {
                let pattern = value_pattern(&setting.value, catalog);
                Regex::new(&pattern)
                    .ok()
                    .map(|regex| (setting.property.to_ascii_lowercase(), regex))
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self { name, settings })
    }

    /// Validated styles of the rule matching one of the settings, when every setting is met.
    fn covered<'a>(&self, rule: &'a RuleSet) -> Vec<&'a Style> {
        let styles: Vec<&Style> = validated_styles(rule)
            .filter(|style| {
                let property = style.property_name();
                self.settings.iter().any(|(name, pattern)| {
                    *name == property && value_matches(pattern, &style.value)
                })
            })
            .collect();
        if styles.len() == self.settings.len() {
            styles
        } else {
            Vec::new()
        }
    }
}

/// `$token` placeholders accept the token by reference or by value; whitespace is optional.
fn value_pattern(value: &str, catalog: &dyn TokenCatalog) -> String {
    let mut pattern = String::from("^(?:");
    let mut cursor = 0;
    for captures in PLACEHOLDER.captures_iter(value) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.name("name")) else {
            continue;
        };
        pattern.push_str(&literal(&value[cursor..whole.start()]));
        match catalog.design_token(name.as_str()) {
            Some(token) => {
                let name = regex::escape(&token.name);
                let token_value = literal(&token.value);
                pattern.push_str(&format!(
                    r"(?:t\(\s*{name}\s*\)|var\(\s*--lwc-{name}\s*(?:,\s*{token_value}\s*)?\)|{token_value})"
                ));
            }
            None => pattern.push_str(&literal(whole.as_str())),
        }
        cursor = whole.end();
    }
    pattern.push_str(&literal(&value[cursor..]));
    pattern.push_str(")$");
    pattern
}

fn literal(text: &str) -> String {
    WHITESPACE
        .split(text)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s*")
}

/// The value as written or any of its equivalent rewrites.
fn value_matches(pattern: &Regex, value: &str) -> bool {
    pattern.is_match(value) || normalizer::expand(value).iter().any(|form| pattern.is_match(form))
}

/// `{"property":"value",...}` in declaration order.
fn display_as_block(styles: &[&Style]) -> String {
    let pairs: Vec<String> = styles
        .iter()
        .map(|style| {
            format!(
                "{}:{}",
                Value::String(style.property.clone()),
                Value::String(style.value.clone())
            )
        })
        .collect();
    format!("{{{}}}", pairs.join(","))
}

/// The edit adding `class_name` to an element, based on how its class attribute is written.
fn class_insertion(path: &Path, element: &HtmlElement, class_name: &str) -> Option<RelatedInformation> {
    let insertion = |at: Position, value: String| RelatedInformation {
        path: Some(path.to_path_buf()),
        range: Range::new(at, at),
        value: Some(value),
    };

    let Some(attribute) = element.attribute("class") else {
        return Some(insertion(
            element.name_range.end,
            format!(" class=\"{class_name}\""),
        ));
    };
    if attribute.computed {
        return None;
    }
    let value = attribute.value.as_deref().unwrap_or_default();
    let value_start = attribute.value_range.map(|range| range.start)?;

    if !attribute.expression {
        return Some(match element.classes.first() {
            Some(first) => insertion(first.range.start, format!("{class_name} ")),
            None => insertion(value_start, class_name.to_string()),
        });
    }

    let marker = value.find(|c| c == '!' || c == '#')?;
    let rest = &value[marker + 1..];
    let offset = marker + 1 + (rest.len() - rest.trim_start().len());
    if value[offset..].starts_with('\'') {
        let at = value_start.advance(&value[..offset + 1]);
        Some(insertion(at, format!("{class_name} ")))
    } else {
        let at = value_start.advance(&value[..marker + 1]);
        Some(insertion(at, format!("'{class_name} ' + ")))
    }
}

pub struct UtilityClassMatcher {
    utilities: Vec<Utility>,
}

impl UtilityClassMatcher {
    pub fn new(catalog: &dyn TokenCatalog) -> Self {
        let utilities = catalog
            .utility_classes()
            .iter()
            .filter_map(|utility| Utility::new(utility, catalog))
            .collect();
        Self { utilities }
    }

    fn match_rule(&self, entry: &Entry, bundle: &Bundle, rule: &RuleSet) -> Option<Recommendation> {
        let mut selected: Vec<(&Selector, Vec<(&Path, &HtmlElement)>)> = Vec::new();
        for rule_selector in &rule.selectors {
            let elements: Vec<(&Path, &HtmlElement)> = bundle
                .markup()
                .flat_map(|(markup_entry, markup)| {
                    selector::select(
                        &rule_selector.text,
                        markup,
                        &entry.component_name,
                        entry.entity_type,
                    )
                    .into_iter()
                    .map(move |element| (markup_entry.path.as_path(), element))
                })
                .collect();
            if !elements.is_empty() {
                selected.push((rule_selector, elements));
            }
        }
        if selected.is_empty() {
            return None;
        }

        let all_selectors = selected.len() == rule.selectors.len();
        let declaration_count = validated_styles(rule).count();
        let items: Vec<Item> = self
            .utilities
            .iter()
            .filter_map(|utility| {
                let styles = utility.covered(rule);
                if styles.is_empty() {
                    return None;
                }
                let mut related: Vec<RelatedInformation> = selected
                    .iter()
                    .flat_map(|(_, elements)| elements.iter())
                    .filter_map(|(path, element)| {
                        class_insertion(path, element, &utility.name.replace('.', ""))
                    })
                    .collect();
                related.sort();
                related.dedup();

                let action = |range: Range| {
                    Action::replace(&utility.name, &utility.name, range)
                        .with_related(related.clone())
                        .with_file_type(InputKind::RuleSet)
                };
                let actions: Vec<Action> = if all_selectors && styles.len() == declaration_count {
                    vec![action(rule.range)]
                } else if all_selectors {
                    styles.iter().map(|style| action(style.range)).collect()
                } else {
                    selected
                        .iter()
                        .map(|(rule_selector, _)| action(rule_selector.range))
                        .collect()
                };
                Some(Item::with_actions(display_as_block(&styles), actions))
            })
            .collect();

        (!items.is_empty()).then(|| Recommendation::new(rule.clone(), items))
    }
}

impl Matcher for UtilityClassMatcher {
    fn name(&self) -> &str {
        "utility-class"
    }

    fn matches(&self, entry: &Entry, bundle: &Bundle, context: &Context) -> Vec<Recommendation> {
        if !context.is_enabled(ContextKey::UtilityClass) {
            return Vec::new();
        }
        let result: Vec<Recommendation> = entry
            .rule_sets()
            .filter_map(|rule| self.match_rule(entry, bundle, rule))
            .collect();
        tracing::debug!(path = %entry.path.display(), found = result.len(), "utility class matcher");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use std::path::PathBuf;

    const MARKUP: &str = "<template>\n  <div class=\"wrapper\">\n    <span class=\"message\">Hi</span>\n    <p>Body</p>\n  </div>\n</template>";

    fn run(stylesheet: &str, markup: &str) -> Vec<Recommendation> {
        let bundle = testing::bundle(&[("card.css", stylesheet), ("card.html", markup)]);
        let entry = bundle
            .entries()
            .iter()
            .find(|entry| entry.path.extension().is_some_and(|ext| ext == "css"))
            .unwrap();
        UtilityClassMatcher::new(&testing::catalog()).matches(entry, &bundle, &Context::default())
    }

    fn markup_path() -> PathBuf {
        testing::entry("card.html", "").path
    }

    #[test]
    fn test_whole_rule_is_replaced() {
        let found = run(".message { display: none; }", MARKUP);
        assert_eq!(found.len(), 1);
        let item = found[0].items.iter().next().unwrap();
        assert_eq!(item.value, r#"{"display":"none"}"#);
        let action = item.actions.iter().next().unwrap();
        assert_eq!(action.name, "slds-hide");
        assert_eq!(action.range, found[0].input.range());
        assert_eq!(
            action.related_information,
            vec![RelatedInformation {
                path: Some(markup_path()),
                range: Range::on_line(2, 17, 17),
                value: Some("slds-hide ".into()),
            }]
        );
    }

    #[test]
    fn test_partial_declarations() {
        let found = run("p { display: none; color: red; }", MARKUP);
        let action = found[0].actions().next().unwrap();
        assert_eq!(action.range, Range::on_line(0, 4, 18));
        assert_eq!(
            action.related_information[0].value.as_deref(),
            Some(" class=\"slds-hide\"")
        );
        assert_eq!(action.related_information[0].range, Range::on_line(3, 6, 6));
    }

    #[test]
    fn test_unmatched_selectors_keep_the_rule() {
        let found = run(".message, .missing { display: none; }", MARKUP);
        let action = found[0].actions().next().unwrap();
        assert_eq!(action.range, Range::on_line(0, 0, 8));
    }

    #[test]
    fn test_token_placeholder_accepts_equivalent_values() {
        for value in ["0.75rem", "12px", "t(spacingSmall)", "var(--lwc-spacingSmall, 0.75rem)"] {
            let found = run(&format!(".wrapper {{ padding: {value}; }}"), MARKUP);
            let names: Vec<_> = found[0].actions().map(|action| action.name.as_str()).collect();
            assert_eq!(names, vec!["slds-p-around_small"], "{value}");
        }
    }

    #[test]
    fn test_every_setting_must_be_met() {
        assert!(run(".message { overflow: hidden; white-space: nowrap; }", MARKUP).is_empty());
        let truncate = ".message { max-width: 100%; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }";
        let found = run(truncate, MARKUP);
        assert!(found[0].actions().any(|action| action.name == "slds-truncate"));
    }

    #[test]
    fn test_no_markup_no_recommendation() {
        assert!(run(".message { display: none; }", "").is_empty());
        assert!(run(".elsewhere { display: none; }", MARKUP).is_empty());
    }

    #[test]
    fn test_expression_class_attributes() {
        let aura = "<aura:component>\n  <div class=\"{!'box ' + v.extra}\"></div>\n  <p class=\"{!v.classes}\"></p>\n</aura:component>";
        let bundle = testing::bundle(&[("card.css", ".THIS div, .THIS p { display: none; }"), ("card.cmp", aura)]);
        let entry = &bundle.entries()[0];
        let found = UtilityClassMatcher::new(&testing::catalog()).matches(entry, &bundle, &Context::default());
        let action = found[0].actions().next().unwrap();
        let values: Vec<_> = action
            .related_information
            .iter()
            .map(|related| related.value.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(values, vec!["slds-hide ", "'slds-hide ' + "]);
    }

    #[test]
    fn test_value_pattern() {
        let catalog = testing::catalog();
        let pattern = Regex::new(&value_pattern("1px solid $colorBorder", &catalog)).unwrap();
        assert!(pattern.is_match("1px solid #dddbda"));
        assert!(pattern.is_match("1px  solid t(colorBorder)"));
        assert!(!pattern.is_match("1px solid #dddbdaff"));
        assert!(!pattern.is_match("1px dashed #dddbda"));
    }
}
