//! Source model for SLDS component analysis
//!
//! Stylesheets, markup and scripts are scanned into the structured
//! [`Input`]s the recommendation engine consumes:
//!
//! - [`css`] turns a stylesheet into rule sets and declarations
//! - [`markup`] builds an element tree for templates and Aura markup
//! - [`script`] finds the functions of a script that reference SLDS classes
//!
//! [`Entry`] ties the three together for one file and [`Bundle`] groups the
//! files of one component. All ranges are zero based line/column pairs.

pub mod css;
pub mod entry;
pub mod error;
pub mod input;
pub mod markup;
pub mod range;
pub mod script;

pub use entry::{Bundle, EntityType, Entry, SourceKind};
pub use error::{Error, Result};
pub use input::{
    AnnotationType, Attribute, Block, ClassName, HtmlElement, Input, InputKind, RuleSet, Selector,
    Style,
};
pub use markup::Markup;
pub use range::{Position, Range, SourceLocation};
