//! Selectors that restyle a design system class

use super::OverrideMatcher;
use crate::catalog::TokenCatalog;
use crate::context::{Context, ContextKey};
use crate::model::{Action, ComponentOverride};
use slds_parser::{Bundle, Entry, InputKind, Range, Selector};
use std::sync::Arc;

pub struct ComponentOverrideMatcher {
    catalog: Arc<dyn TokenCatalog>,
}

/// The design system class named by the last compound of a selector, and its byte offset.
fn overridden_class(selector: &str) -> Option<(&str, usize)> {
    let last = selector.split(' ').last()?;
    if !last.contains(".slds") {
        return None;
    }
    let offset = selector.len() - last.len();
    let class = last
        .split(['.', '#'])
        .find(|part| part.starts_with("slds"))?;
    let end = class.find([':', '[']).unwrap_or(class.len());
    Some((&class[..end], offset))
}

impl ComponentOverrideMatcher {
    pub fn new(catalog: Arc<dyn TokenCatalog>) -> Self {
        Self { catalog }
    }
}

impl OverrideMatcher for ComponentOverrideMatcher {
    fn overrides(&self, entry: &Entry, _bundle: &Bundle, context: &Context) -> Vec<ComponentOverride> {
        if !context.is_enabled(ContextKey::Override) {
            return Vec::new();
        }
        let valid = self.catalog.valid_utility_class_names();
        let mut result = Vec::new();
        for rule in entry.rule_sets() {
            for selector in &rule.selectors {
                let Some((class, offset)) = overridden_class(&selector.text) else {
                    continue;
                };
                if !valid.contains(class) {
                    continue;
                }
                let range = if selector.range.is_single_line() {
                    let start = selector.range.start.shifted(offset);
                    Range::new(start, start.shifted(selector.text.len() - offset))
                } else {
                    selector.range
                };
                result.push(ComponentOverride {
                    rule_set: rule.clone(),
                    selector: Selector {
                        text: selector.text.clone(),
                        range: selector.range,
                    },
                    overridden_class: class.to_string(),
                    action: Action::note(class, range)
                        .with_value(class)
                        .with_file_type(InputKind::RuleSet),
                });
            }
        }
        tracing::debug!(path = %entry.path.display(), found = result.len(), "component override matcher");
        result
    }
}
