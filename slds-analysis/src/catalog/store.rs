use super::{ComponentBlueprint, DesignToken, TokenCatalog, TokenType, UtilityClass};
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

const BUNDLED: &str = include_str!("../../data/catalog.json");

static CLASS_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r#"slds-[^\s,\[:\]\.";]*"#).unwrap());

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tokens: Vec<DesignToken>,
    #[serde(default)]
    utilities: Vec<UtilityClass>,
    #[serde(default)]
    blueprints: Vec<ComponentBlueprint>,
}

/// A frozen snapshot of tokens, utility classes and component blueprints
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tokens: Vec<DesignToken>,
    index: HashMap<String, usize>,
    categories: Vec<String>,
    utilities: Vec<UtilityClass>,
    blueprints: Vec<ComponentBlueprint>,
    valid_classes: BTreeSet<String>,
}

impl Catalog {
    pub fn new(
        tokens: Vec<DesignToken>,
        utilities: Vec<UtilityClass>,
        blueprints: Vec<ComponentBlueprint>,
    ) -> Self {
        let index = tokens
            .iter()
            .enumerate()
            .map(|(position, token)| (token.name.clone(), position))
            .collect();
        let categories: BTreeSet<String> = tokens
            .iter()
            .map(|token| token.category.clone())
            .filter(|category| !category.is_empty())
            .collect();
        let valid_classes = valid_class_names(&utilities, &blueprints);
        Self {
            tokens,
            index,
            categories: categories.into_iter().collect(),
            utilities,
            blueprints,
            valid_classes,
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(text)?;
        let catalog = Self::new(file.tokens, file.utilities, file.blueprints);
        tracing::debug!(
            tokens = catalog.tokens.len(),
            utilities = catalog.utilities.len(),
            blueprints = catalog.blueprints.len(),
            "loaded token catalog"
        );
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        Self::from_json(&text)
    }

    /// The catalog shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED)
    }

    pub fn tokens(&self) -> &[DesignToken] {
        &self.tokens
    }
}

fn valid_class_names(utilities: &[UtilityClass], blueprints: &[ComponentBlueprint]) -> BTreeSet<String> {
    let blueprint_selectors = blueprints.iter().flat_map(|blueprint| {
        blueprint.selectors.iter().chain(
            blueprint
                .tokens
                .values()
                .flat_map(|token| token.css_selectors.iter()),
        )
    });
    let utility_names = utilities.iter().map(|utility| &utility.name);

    blueprint_selectors
        .chain(utility_names)
        .flat_map(|text| CLASS_NAME.find_iter(text))
        .map(|found| found.as_str().to_string())
        .collect()
}

impl TokenCatalog for Catalog {
    fn design_token(&self, name: &str) -> Option<&DesignToken> {
        self.index.get(name).map(|position| &self.tokens[*position])
    }

    fn design_tokens_by_category(&self, category: &str) -> Vec<&DesignToken> {
        self.tokens
            .iter()
            .filter(|token| {
                token.category == category
                    && token.is_global()
                    && token.token_type != TokenType::Component
            })
            .collect()
    }

    fn design_token_categories(&self) -> Vec<&str> {
        self.categories.iter().map(String::as_str).collect()
    }

    fn utility_classes(&self) -> &[UtilityClass] {
        &self.utilities
    }

    fn valid_utility_class_names(&self) -> &BTreeSet<String> {
        &self.valid_classes
    }

    fn component_blueprints(&self) -> &[ComponentBlueprint] {
        &self.blueprints
    }

    fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.utilities.is_empty()
    }
}
