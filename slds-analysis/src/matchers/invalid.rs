//! Design system class names the catalog does not know

use super::classes::{self, Occurrence};
use super::Matcher;
use crate::catalog::TokenCatalog;
use crate::context::{Context, ContextKey};
use crate::model::{Action, Item, Recommendation};
use once_cell::sync::Lazy;
use regex::Regex;
use slds_parser::{Bundle, Entry, Input, InputKind};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Names ending in `-` or `_` are prefixes of a BEM name built at runtime.
static CANDIDATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^slds.*[^-_]$").unwrap());

static ICON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^slds-icon-(?P<type>[a-z]*)-[^\s,\[:\]\.";]*$"#).unwrap());

const ICON_TYPES: &[&str] = &["utility", "action", "custom", "doctype", "standard"];

pub struct InvalidMatcher {
    catalog: Arc<dyn TokenCatalog>,
}

impl InvalidMatcher {
    pub fn new(catalog: Arc<dyn TokenCatalog>) -> Self {
        Self { catalog }
    }

    fn items(&self, occurrences: &[Occurrence], kind: InputKind) -> Vec<Item> {
        let mut candidates: BTreeMap<&str, Vec<&Occurrence>> = BTreeMap::new();
        for occurrence in occurrences {
            let is_icon = ICON
                .captures(&occurrence.name)
                .and_then(|captures| captures.name("type"))
                .is_some_and(|kind| ICON_TYPES.contains(&kind.as_str()));
            if !is_icon && CANDIDATE.is_match(&occurrence.name) {
                candidates
                    .entry(occurrence.name.as_str())
                    .or_default()
                    .push(occurrence);
            }
        }

        let label = candidates.keys().copied().collect::<Vec<_>>().join(",");
        let valid = self.catalog.valid_utility_class_names();
        candidates
            .iter()
            .filter(|(name, _)| !valid.contains(**name))
            .flat_map(|(name, found)| {
                found.iter().map(|occurrence| {
                    Item::new(
                        label.clone(),
                        Action::remove(*name, occurrence.range).with_file_type(kind),
                    )
                })
            })
            .collect()
    }
}

impl Matcher for InvalidMatcher {
    fn name(&self) -> &str {
        "invalid"
    }

    fn matches(&self, entry: &Entry, _bundle: &Bundle, context: &Context) -> Vec<Recommendation> {
        if !context.is_enabled(ContextKey::Invalid) {
            return Vec::new();
        }

        let mut result = Vec::new();
        for input in &entry.inputs {
            let items = match input {
                Input::HtmlElement(element) if element.attribute("class").is_some() => self.items(
                    &classes::element_classes(element),
                    InputKind::HtmlElement,
                ),
                Input::Block(block) => {
                    self.items(&classes::script_classes(block), InputKind::Block)
                }
                _ => continue,
            };
            if !items.is_empty() {
                result.push(Recommendation::new(input.clone(), items));
            }
        }
        tracing::debug!(path = %entry.path.display(), found = result.len(), "invalid class matcher");
        result
    }
}
