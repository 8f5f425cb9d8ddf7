//! Token recommendation engine
//!
//! Turns the structured inputs of an SLDS component into recommendations:
//! design tokens for literal values, utility classes for whole rules, current
//! names for deprecated tokens and classes, and mobile readiness notes.
//!
//! Data flows one way:
//!
//! ```text
//! Entry/Bundle -> matchers -> Aggregator -> processor -> Report
//! ```
//!
//! - [`normalizer`] expands a CSS value into every equivalent spelling
//! - [`catalog`] answers token and utility class queries
//! - [`matchers`] each look at one concern
//! - [`aggregator`] merges what matchers found for the same input
//! - [`processor`] suppresses redundant findings and orders the rest
//! - [`runner`] ties it together for one entry

pub mod aggregator;
pub mod catalog;
pub mod context;
pub mod error;
pub mod matchers;
pub mod model;
pub mod normalizer;
pub mod processor;
pub mod runner;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use aggregator::{Aggregator, Equivalence};
pub use catalog::{Catalog, ComponentRegistry, DesignToken, RuleTable, TokenCatalog};
pub use context::{Context, ContextKey};
pub use error::{Error, Result};
pub use model::{
    Action, ActionType, ComponentOverride, Item, Recommendation, RelatedInformation, Report,
};
pub use runner::Runner;
