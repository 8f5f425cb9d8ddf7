use super::{DesignToken, Priority, TokenType};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const BUNDLED: &str = include_str!("../../data/rules.yaml");

/// A prioritized group of replacements, keyed by the new name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityRule {
    pub name: String,
    pub category: String,
    pub token_type: TokenType,
    #[serde(default)]
    pub properties: Vec<String>,
    /// New name to the value it replaces.
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
}

impl PriorityRule {
    pub fn is_bem(&self) -> bool {
        self.name == "bem-naming"
    }

    pub fn design_tokens(&self) -> Vec<DesignToken> {
        self.tokens
            .iter()
            .map(|(name, value)| DesignToken {
                name: name.clone(),
                value: value.clone(),
                category: self.category.clone(),
                css_properties: self.properties.clone(),
                token_type: self.token_type,
                priority: Priority::High,
                deprecated: None,
                comment: None,
                scope: None,
            })
            .collect()
    }
}

/// Deprecated token names to their successors
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuccessorRule {
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTable {
    #[serde(default)]
    pub priorities: Vec<PriorityRule>,
    #[serde(default)]
    pub design_tokens: Vec<SuccessorRule>,
}

impl RuleTable {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        Self::from_yaml(&text)
    }

    pub fn bundled() -> Result<Self> {
        Self::from_yaml(BUNDLED)
    }

    pub fn successors(&self) -> HashMap<String, String> {
        self.design_tokens
            .iter()
            .flat_map(|rule| rule.tokens.iter())
            .map(|(old, new)| (old.clone(), new.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_rules() {
        let rules = RuleTable::bundled().unwrap();
        assert!(rules.priorities.iter().any(PriorityRule::is_bem));
        assert_eq!(
            rules.successors().get("fontSizeMedium").map(String::as_str),
            Some("fontSize5")
        );
    }

    #[test]
    fn test_priority_tokens() {
        let rules = RuleTable::from_yaml(
            "priorities:\n  - name: density\n    category: spacing\n    tokenType: TOKEN\n    properties: [\"padding*\"]\n    tokens:\n      varSpacingSmall: 0.75rem\n",
        )
        .unwrap();
        let tokens = rules.priorities[0].design_tokens();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].name, "varSpacingSmall");
        assert_eq!(tokens[0].value, "0.75rem");
        assert_eq!(tokens[0].priority, Priority::High);
        assert!(tokens[0].applies_to("padding-top"));
    }

    #[test]
    fn test_malformed_rules() {
        assert!(matches!(
            RuleTable::from_yaml("priorities: 4"),
            Err(Error::RuleFormat(_))
        ));
    }
}
