//! Matchers
//!
//! Each matcher is a pure function of an entry, its sibling bundle and the
//! analysis [`Context`]. They share nothing mutable and can run concurrently;
//! their outputs are merged by the [`crate::aggregator::Aggregator`].

pub mod component_override;
pub mod design_token;
pub mod invalid;
pub mod mobile;
pub mod priority;
pub mod selector;
pub mod token_category;
pub mod utility_class;

mod classes;
mod declaration;

use crate::context::Context;
use crate::model::{ComponentOverride, Recommendation};
use slds_parser::{Bundle, Entry, RuleSet, Style};

pub use component_override::ComponentOverrideMatcher;
pub use design_token::DesignTokenMatcher;
pub use invalid::InvalidMatcher;
pub use mobile::{MarkupLabelMatcher, MobileCssMatcher, MobileFriendlyMatcher};
pub use priority::PriorityMatcher;
pub use token_category::TokenCategoryMatcher;
pub use utility_class::UtilityClassMatcher;

pub trait Matcher: Send + Sync {
    fn name(&self) -> &str;

    fn matches(&self, entry: &Entry, bundle: &Bundle, context: &Context) -> Vec<Recommendation>;
}

/// Finds selectors that restyle design system classes
pub trait OverrideMatcher: Send + Sync {
    fn overrides(&self, entry: &Entry, bundle: &Bundle, context: &Context)
        -> Vec<ComponentOverride>;
}

/// Styles whose own annotation and whose rule's annotation allow validation.
pub(crate) fn validated_styles(rule: &RuleSet) -> impl Iterator<Item = &Style> {
    let rule_allowed = rule.annotation.validate();
    rule.styles
        .iter()
        .filter(move |style| rule_allowed && style.annotation.validate())
}

/// Every validated style of an entry along with its rule.
pub(crate) fn entry_styles(entry: &Entry) -> impl Iterator<Item = (&RuleSet, &Style)> {
    entry
        .rule_sets()
        .flat_map(|rule| validated_styles(rule).map(move |style| (rule, style)))
}
