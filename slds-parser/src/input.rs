//! Structured inputs handed to the recommendation engine
//!
//! Scanners turn raw stylesheet, markup and script text into these values.
//! [`Input`] is a closed union; consumers match on it exhaustively instead of
//! downcasting.

use crate::range::{Position, Range};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validator annotation attached to a declaration, rule or markup comment
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnotationType {
    #[default]
    None,
    Allow,
    Ignore,
    IgnoreNextLine,
    Warn,
}

impl AnnotationType {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            AnnotationType::None => None,
            AnnotationType::Allow => Some("sldsValidatorAllow"),
            AnnotationType::Ignore => Some("sldsValidatorIgnore"),
            AnnotationType::IgnoreNextLine => Some("sldsValidatorIgnoreNextLine"),
            AnnotationType::Warn => Some("sldsValidatorWarn"),
        }
    }

    /// Reads the annotation named in a comment body. `IgnoreNextLine` is checked
    /// before `Ignore` since its keyword extends the shorter one.
    pub fn from_comment(text: &str) -> Self {
        [
            AnnotationType::IgnoreNextLine,
            AnnotationType::Ignore,
            AnnotationType::Allow,
            AnnotationType::Warn,
        ]
        .into_iter()
        .find(|kind| kind.keyword().is_some_and(|keyword| text.contains(keyword)))
        .unwrap_or(AnnotationType::None)
    }

    /// Whether matchers may look at an input carrying this annotation.
    pub fn validate(self) -> bool {
        !matches!(
            self,
            AnnotationType::Ignore | AnnotationType::IgnoreNextLine
        )
    }
}

/// A single `property: value` declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    pub property: String,
    pub value: String,
    /// From the property name through the terminating `;` when present.
    pub range: Range,
    pub value_range: Range,
    #[serde(default)]
    pub annotation: AnnotationType,
}

impl Style {
    /// Lower-cased property, except custom properties which keep their case.
    pub fn property_name(&self) -> String {
        if self.property.starts_with("--") {
            self.property.clone()
        } else {
            self.property.to_ascii_lowercase()
        }
    }

    /// Position of a byte offset inside the value text.
    pub fn value_position(&self, offset: usize) -> Position {
        let head = &self.value[..offset.min(self.value.len())];
        self.value_range.start.advance(head)
    }

    /// Range of a byte span inside the value text.
    pub fn value_span_range(&self, start: usize, end: usize) -> Range {
        Range::new(self.value_position(start), self.value_position(end))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub text: String,
    pub range: Range,
}

/// A stylesheet rule: its comma separated selectors and the declarations in its body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleSet {
    pub selectors: Vec<Selector>,
    pub styles: Vec<Style>,
    pub range: Range,
    #[serde(default)]
    pub annotation: AnnotationType,
}

impl RuleSet {
    pub fn selector_text(&self) -> String {
        self.selectors
            .iter()
            .map(|selector| selector.text.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.selector_text())?;
        for style in &self.styles {
            write!(f, "{}: {};", style.property, style.value)?;
        }
        write!(f, "}}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    /// Value without its surrounding quotes or braces.
    pub value: Option<String>,
    pub range: Range,
    pub value_range: Option<Range>,
    /// Written as a framework expression: `{!v.x}`, `{#v.x}` or an LWC `{binding}`.
    #[serde(default)]
    pub expression: bool,
    /// True for unquoted `{binding}` values.
    #[serde(default)]
    pub computed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassName {
    pub name: String,
    pub range: Range,
}

/// A markup element. `parent` and `children` index into the owning [`crate::markup::Markup`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HtmlElement {
    pub id: usize,
    pub tag: String,
    pub attributes: Vec<Attribute>,
    pub classes: Vec<ClassName>,
    pub range: Range,
    /// Range of the tag name inside the opening tag.
    pub name_range: Range,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl HtmlElement {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name.eq_ignore_ascii_case(name))
    }

    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name)
            .and_then(|attribute| attribute.value.as_deref())
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|class| class.name == name)
    }
}

/// A named script function (or, as a fallback, a single line) that may reference classes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub function_name: String,
    pub value: String,
    pub line_number: usize,
    pub range: Range,
}

impl Block {
    pub fn value_span_range(&self, start: usize, end: usize) -> Range {
        let origin = self.range.start;
        Range::new(
            origin.advance(&self.value[..start.min(self.value.len())]),
            origin.advance(&self.value[..end.min(self.value.len())]),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputKind {
    RuleSet,
    Style,
    HtmlElement,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Input {
    Style(Style),
    RuleSet(RuleSet),
    HtmlElement(HtmlElement),
    Block(Block),
}

impl Input {
    pub fn kind(&self) -> InputKind {
        match self {
            Input::Style(_) => InputKind::Style,
            Input::RuleSet(_) => InputKind::RuleSet,
            Input::HtmlElement(_) => InputKind::HtmlElement,
            Input::Block(_) => InputKind::Block,
        }
    }

    pub fn range(&self) -> Range {
        match self {
            Input::Style(style) => style.range,
            Input::RuleSet(rule) => rule.range,
            Input::HtmlElement(element) => element.range,
            Input::Block(block) => block.range,
        }
    }

    /// The text each kind is ordered by within its own group.
    pub fn sort_key(&self) -> String {
        match self {
            Input::Style(style) => style.property.clone(),
            Input::RuleSet(rule) => rule.to_string(),
            Input::HtmlElement(element) => element.tag.clone(),
            Input::Block(block) => block.function_name.clone(),
        }
    }
}

impl From<Style> for Input {
    fn from(style: Style) -> Self {
        Input::Style(style)
    }
}

impl From<RuleSet> for Input {
    fn from(rule: RuleSet) -> Self {
        Input::RuleSet(rule)
    }
}

impl From<HtmlElement> for Input {
    fn from(element: HtmlElement) -> Self {
        Input::HtmlElement(element)
    }
}

impl From<Block> for Input {
    fn from(block: Block) -> Self {
        Input::Block(block)
    }
}
