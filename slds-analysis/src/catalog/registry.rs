use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

const BUNDLED: &str = include_str!("../../data/mobile.json");

#[derive(Debug, Deserialize)]
struct Component {
    namespace: String,
    component: String,
}

/// Components known to have issues on mobile devices, as `namespace:name`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentRegistry {
    unfriendly: BTreeSet<String>,
}

impl ComponentRegistry {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unfriendly: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let components: Vec<Component> = serde_json::from_str(text)?;
        Ok(Self::new(components.into_iter().map(|component| {
            format!("{}:{}", component.namespace, component.component)
        })))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        Self::from_json(&text)
    }

    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED)
    }

    /// Accepts `ns:name` tags and their LWC spelling `ns-kebab-name`.
    pub fn is_mobile_unfriendly(&self, tag: &str) -> bool {
        self.unfriendly.contains(&component_name(tag))
    }
}

/// `lightning-button-icon` becomes `lightning:buttonIcon`; `ui:inputDate` is kept.
pub fn component_name(tag: &str) -> String {
    if tag.contains(':') {
        return tag.to_string();
    }
    let mut parts = tag.split('-');
    let namespace = parts.next().unwrap_or_default();
    let name: String = parts
        .enumerate()
        .map(|(position, part)| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) if position > 0 => first.to_uppercase().chain(chars).collect(),
                Some(first) => std::iter::once(first).chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    if name.is_empty() {
        namespace.to_string()
    } else {
        format!("{namespace}:{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("lightning-button-icon", "lightning:buttonIcon")]
    #[case("lightning-tree-grid", "lightning:treeGrid")]
    #[case("lightning-card", "lightning:card")]
    #[case("ui:inputDate", "ui:inputDate")]
    #[case("div", "div")]
    fn test_component_name(#[case] tag: &str, #[case] expected: &str) {
        assert_eq!(component_name(tag), expected);
    }

    #[test]
    fn test_bundled_registry() {
        let registry = ComponentRegistry::bundled().unwrap();
        assert!(registry.is_mobile_unfriendly("lightning-tree-grid"));
        assert!(registry.is_mobile_unfriendly("lightning:treeGrid"));
        assert!(!registry.is_mobile_unfriendly("lightning-card"));
    }
}
