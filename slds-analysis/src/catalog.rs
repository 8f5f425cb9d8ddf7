//! Design token and utility class catalog
//!
//! The engine only reads the catalog through [`TokenCatalog`]. [`Catalog`] is
//! the JSON-backed implementation, [`RuleTable`] holds the prioritized rules
//! and deprecation successors, and [`ComponentRegistry`] lists components
//! that misbehave on mobile devices.

pub mod registry;
pub mod rules;
pub mod store;

use serde::{Deserialize, Serialize};
use slds_parser::EntityType;
use std::collections::{BTreeMap, BTreeSet};

pub use registry::ComponentRegistry;
pub use rules::{PriorityRule, RuleTable, SuccessorRule};
pub use store::Catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    Utility,
    #[default]
    Token,
    Component,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    #[default]
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignToken {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub category: String,
    /// May carry leading or trailing `*` wildcards.
    #[serde(default)]
    pub css_properties: Vec<String>,
    #[serde(default)]
    pub token_type: TokenType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl DesignToken {
    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }

    pub fn is_global(&self) -> bool {
        self.scope
            .as_deref()
            .map_or(true, |scope| scope.eq_ignore_ascii_case("global"))
    }

    pub fn applies_to(&self, property: &str) -> bool {
        self.css_properties
            .iter()
            .any(|pattern| wildcard_match(pattern, property))
    }

    /// How the token is referenced from a stylesheet of the given flavor.
    pub fn reference(&self, entity: EntityType) -> String {
        reference(&self.name, &self.value, entity)
    }

    /// A successor named in the comment as `UPPER_SNAKE_CASE`, in camel case.
    pub fn successor_from_comment(&self) -> Option<String> {
        let comment = self.comment.as_deref()?;
        let word = comment
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric() && c != '_'))
            .find(|word| word.contains('_'))?;
        Some(snake_to_camel(word))
    }
}

/// Formats a token reference: `var(--lwc-name, value)`, `t(name)` or the bare name.
pub fn reference(name: &str, value: &str, entity: EntityType) -> String {
    match entity {
        EntityType::Lwc => format!("var(--lwc-{name}, {value})"),
        EntityType::Aura => format!("t({name})"),
        EntityType::Other => name.to_string(),
    }
}

fn snake_to_camel(word: &str) -> String {
    let joined: String = word
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let lower = part.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => joined,
    }
}

/// `*` matches any run of characters; everything else is literal.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == text;
    }
    let (first, rest) = (parts[0], &parts[1..]);
    let Some(mut remaining) = text.strip_prefix(first) else {
        return false;
    };
    let (last, middle) = rest.split_last().unwrap_or((&"", &[]));
    for part in middle {
        match remaining.find(part) {
            Some(at) => remaining = &remaining[at + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Setting {
    pub property: String,
    pub value: String,
}

/// A class whose application is equivalent to a fixed set of declarations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtilityClass {
    /// Comma separated aliases.
    pub name: String,
    pub settings: Vec<Setting>,
}

impl UtilityClass {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.name
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentToken {
    #[serde(default)]
    pub css_selectors: Vec<String>,
}

/// Selectors and component-scoped tokens of one design system component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentBlueprint {
    pub name: String,
    #[serde(default)]
    pub selectors: Vec<String>,
    #[serde(default)]
    pub tokens: BTreeMap<String, ComponentToken>,
}

/// Read-only queries the matchers run against the catalog
pub trait TokenCatalog: Send + Sync {
    fn design_token(&self, name: &str) -> Option<&DesignToken>;

    /// Global tokens of one category.
    fn design_tokens_by_category(&self, category: &str) -> Vec<&DesignToken>;

    /// Sorted.
    fn design_token_categories(&self) -> Vec<&str>;

    fn utility_classes(&self) -> &[UtilityClass];

    fn valid_utility_class_names(&self) -> &BTreeSet<String>;

    fn component_blueprints(&self) -> &[ComponentBlueprint];

    fn is_empty(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn token(comment: Option<&str>) -> DesignToken {
        DesignToken {
            name: "fontSizeSmall".into(),
            value: "0.8125rem".into(),
            category: "font-size".into(),
            css_properties: vec!["font".into(), "font-size".into()],
            token_type: TokenType::Token,
            priority: Priority::Normal,
            deprecated: Some("true".into()),
            comment: comment.map(str::to_string),
            scope: None,
        }
    }

    #[rstest]
    #[case("padding*", "padding-left", true)]
    #[case("padding*", "padding", true)]
    #[case("*-color", "border-color", true)]
    #[case("*-color", "color", false)]
    #[case("border*radius", "border-top-left-radius", true)]
    #[case("*", "anything", true)]
    #[case("margin", "margin-top", false)]
    fn test_wildcard_match(#[case] pattern: &str, #[case] text: &str, #[case] expected: bool) {
        assert_eq!(wildcard_match(pattern, text), expected);
    }

    #[rstest]
    #[case(Some("Use FONT_SIZE_2 instead."), Some("fontSize2"))]
    #[case(Some("Deprecated: see SPACING_X_SMALL"), Some("spacingXSmall"))]
    #[case(Some("No longer supported"), None)]
    #[case(None, None)]
    fn test_successor_from_comment(#[case] comment: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(token(comment).successor_from_comment().as_deref(), expected);
    }

    #[test]
    fn test_reference_formats() {
        let token = token(None);
        assert_eq!(
            token.reference(EntityType::Lwc),
            "var(--lwc-fontSizeSmall, 0.8125rem)"
        );
        assert_eq!(token.reference(EntityType::Aura), "t(fontSizeSmall)");
        assert_eq!(token.reference(EntityType::Other), "fontSizeSmall");
    }

    #[test]
    fn test_utility_names_are_trimmed() {
        let utility = UtilityClass {
            name: "slds-p-around_small, slds-p-around--small".into(),
            settings: Vec::new(),
        };
        assert_eq!(
            utility.names().collect::<Vec<_>>(),
            vec!["slds-p-around_small", "slds-p-around--small"]
        );
    }
}
