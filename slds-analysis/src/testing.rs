//! Fixtures shared by unit tests and downstream crates' tests.

use crate::catalog::{Catalog, ComponentRegistry, DesignToken, RuleTable, TokenCatalog, TokenType};
use crate::runner::Runner;
use slds_parser::{Bundle, Entry};
use std::sync::Arc;

const COMPONENT_DIR: &str = "force-app/main/default/card";

fn spacing(name: &str, value: &str) -> DesignToken {
    DesignToken {
        name: name.to_string(),
        value: value.to_string(),
        category: "spacing".to_string(),
        css_properties: vec!["padding*".to_string(), "margin*".to_string()],
        token_type: TokenType::Token,
        priority: Default::default(),
        deprecated: None,
        comment: None,
        scope: None,
    }
}

/// The bundled catalog plus a zero spacing token and a token aliasing another by name.
pub fn catalog() -> Catalog {
    let bundled = Catalog::bundled().expect("bundled catalog");
    let mut tokens = bundled.tokens().to_vec();
    tokens.push(spacing("spacingNone", "0"));
    tokens.push(spacing("varSpacingXSmall", "spacingXSmall"));
    Catalog::new(
        tokens,
        bundled.utility_classes().to_vec(),
        bundled.component_blueprints().to_vec(),
    )
}

pub fn rules() -> RuleTable {
    RuleTable::bundled().expect("bundled rules")
}

pub fn registry() -> ComponentRegistry {
    ComponentRegistry::bundled().expect("bundled registry")
}

pub fn runner() -> Runner {
    let catalog: Arc<dyn TokenCatalog> = Arc::new(catalog());
    Runner::new(catalog, rules(), registry()).expect("runner")
}

/// An entry named `file_name` inside a component directory.
pub fn entry(file_name: &str, source: &str) -> Entry {
    Entry::from_source(format!("{COMPONENT_DIR}/{file_name}"), source)
}

/// A bundle of `(file name, source)` pairs in one component directory.
pub fn bundle(files: &[(&str, &str)]) -> Bundle {
    Bundle::new(
        files
            .iter()
            .map(|(file_name, source)| entry(file_name, source))
            .collect(),
    )
}
