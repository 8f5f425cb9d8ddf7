//! Literal values that a catalog token of the matching category could replace

use super::declaration::match_style;
use super::{entry_styles, Matcher};
use crate::catalog::{DesignToken, TokenCatalog};
use crate::context::{Context, ContextKey};
use crate::model::Recommendation;
use slds_parser::{Bundle, Entry};

pub struct TokenCategoryMatcher {
    name: String,
    tokens: Vec<DesignToken>,
}

impl TokenCategoryMatcher {
    /// Current global tokens of the listed categories; `*` selects all of them.
    pub fn new(catalog: &dyn TokenCatalog, categories: &[&str]) -> Self {
        let tokens = catalog
            .design_token_categories()
            .into_iter()
            .filter(|category| categories.contains(&"*") || categories.contains(category))
            .flat_map(|category| catalog.design_tokens_by_category(category))
            .filter(|token| !token.is_deprecated())
            .cloned()
            .collect();
        Self {
            name: format!("token-category({})", categories.join(",")),
            tokens,
        }
    }

    /// One matcher per catalog category.
    pub fn per_category(catalog: &dyn TokenCatalog) -> Vec<Self> {
        catalog
            .design_token_categories()
            .into_iter()
            .map(|category| Self::new(catalog, &[category]))
            .filter(|matcher| !matcher.tokens.is_empty())
            .collect()
    }
}

impl Matcher for TokenCategoryMatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, entry: &Entry, _bundle: &Bundle, context: &Context) -> Vec<Recommendation> {
        if !context.is_enabled(ContextKey::DesignToken) {
            return Vec::new();
        }
        let result: Vec<Recommendation> = entry_styles(entry)
            .filter_map(|(_, style)| match_style(style, &self.tokens, entry.entity_type))
            .collect();
        tracing::debug!(matcher = %self.name, found = result.len(), "token category matcher");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use slds_parser::Range;

    fn run(category: &str, source: &str) -> Vec<Recommendation> {
        let catalog = testing::catalog();
        let bundle = testing::bundle(&[("card.css", source)]);
        TokenCategoryMatcher::new(&catalog, &[category]).matches(
            &bundle.entries()[0],
            &bundle,
            &Context::default(),
        )
    }

    #[test]
    fn test_color_literal() {
        let found = run("text-color", ".THIS .title { color: #C23934; }");
        assert_eq!(found.len(), 1);
        let item = found[0].items.iter().next().unwrap();
        assert_eq!(item.value, "#C23934");
        let action = item.actions.iter().next().unwrap();
        assert_eq!(action.name, "colorTextError");
        assert_eq!(action.value.as_deref(), Some("t(colorTextError)"));
        assert_eq!(action.range, Range::on_line(0, 22, 29));
    }

    #[test]
    fn test_other_categories_are_ignored() {
        assert!(run("spacing", ".THIS .title { color: #C23934; }").is_empty());
    }

    #[test]
    fn test_deprecated_tokens_are_not_suggested() {
        let found = run("font-size", ".a { font-size: 12px; }");
        let names: Vec<_> = found[0].actions().map(|action| action.name.as_str()).collect();
        assert_eq!(names, vec!["fontSize2"]);
    }

    #[test]
    fn test_scoped_tokens_are_not_suggested() {
        let found = run("spacing", ".a { margin: 1.5rem; }");
        let names: Vec<_> = found[0].actions().map(|action| action.name.as_str()).collect();
        assert_eq!(names, vec!["spacingLarge"]);
    }

    #[test]
    fn test_disabled() {
        let catalog = testing::catalog();
        let bundle = testing::bundle(&[("card.css", ".a { margin: 1rem; }")]);
        let matcher = TokenCategoryMatcher::new(&catalog, &["*"]);
        let context = Context::with_disabled(["design_token"]);
        assert!(matcher.matches(&bundle.entries()[0], &bundle, &context).is_empty());
    }

    #[test]
    fn test_per_category() {
        let catalog = testing::catalog();
        let matchers = TokenCategoryMatcher::per_category(&catalog);
        assert!(matchers.iter().any(|matcher| matcher.name() == "token-category(spacing)"));
    }
}
