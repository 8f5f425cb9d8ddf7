//! Value normalization
//!
//! A CSS value can be written many ways: `16px` and `1rem`, `#c81e1e` and
//! `rgb(200, 30, 30)`, `t(spacingSmall)` and the bare token name. The
//! normalizer runs an ordered list of [`Recognizer`]s over a value; each one
//! registers, per matched [`Span`], the textual forms the match is equivalent
//! to. The resulting [`NormalizedState`] can then be expanded into every
//! complete rewrite of the value.
//!
//! Recognized spans that are properly enclosed by another span are dropped
//! when the state is finished: a whole `rgb(...)` match wins over the numbers
//! inside it.

pub mod color;
mod named_colors;
pub mod number;
pub(crate) mod pattern;
pub mod token;

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub use color::ColorRecognizer;
pub use number::NumberRecognizer;
pub use token::TokenRecognizer;

/// Half-open byte span `[start, end)` within one value string
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Strictly wider on both sides.
    pub fn properly_contains(&self, other: &Span) -> bool {
        self.start < other.start && self.end > other.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl From<regex::Match<'_>> for Span {
    fn from(found: regex::Match<'_>) -> Self {
        Span::new(found.start(), found.end())
    }
}

/// Equivalent forms registered while recognizers run
#[derive(Debug, Default)]
pub struct StateBuilder {
    values: BTreeMap<Span, BTreeSet<String>>,
}

impl StateBuilder {
    pub fn add(&mut self, span: Span, value: impl Into<String>) {
        self.values.entry(span).or_default().insert(value.into());
    }

    fn finish(self, input: &str) -> NormalizedState {
        let spans: Vec<Span> = self.values.keys().copied().collect();
        let values = self
            .values
            .into_iter()
            .filter(|(span, _)| !spans.iter().any(|other| other.properly_contains(span)))
            .collect();
        NormalizedState {
            input: input.to_string(),
            values,
        }
    }
}

/// The recognized spans of one value and their equivalent forms.
///
/// Immutable once built; no span in it is properly contained by another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedState {
    input: String,
    values: BTreeMap<Span, BTreeSet<String>>,
}

impl NormalizedState {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn values(&self) -> &BTreeMap<Span, BTreeSet<String>> {
        &self.values
    }

    pub fn get(&self, span: &Span) -> Option<&BTreeSet<String>> {
        self.values.get(span)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Text of the input covered by `span`.
    pub fn text(&self, span: &Span) -> &str {
        &self.input[span.start..span.end]
    }

    /// Every rewrite of the input obtained by replacing each recognized span
    /// with one of its equivalent forms. Text between spans is kept verbatim.
    /// A span overlapping the previously used one is skipped.
    pub fn expand(&self) -> BTreeSet<String> {
        let mut results = vec![String::new()];
        let mut cursor = 0;
        for (span, alternatives) in &self.values {
            if span.start < cursor {
                continue;
            }
            let between = &self.input[cursor..span.start];
            results = results
                .iter()
                .flat_map(|prefix| {
                    alternatives
                        .iter()
                        .map(move |alternative| format!("{prefix}{between}{alternative}"))
                })
                .collect();
            cursor = span.end;
        }
        let suffix = &self.input[cursor..];
        results
            .into_iter()
            .map(|prefix| prefix + suffix)
            .collect()
    }
}

/// Registers equivalent forms for the matches of one family of patterns
pub trait Recognizer: Send + Sync {
    fn recognize(&self, input: &str, state: &mut StateBuilder);
}

pub struct Normalizer {
    recognizers: Vec<Box<dyn Recognizer>>,
}

impl Normalizer {
    pub fn new(recognizers: Vec<Box<dyn Recognizer>>) -> Self {
        Self { recognizers }
    }

    /// Colors, then numbers, then token references.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(ColorRecognizer),
            Box::new(NumberRecognizer),
            Box::new(TokenRecognizer),
        ])
    }

    pub fn normalize(&self, input: &str) -> NormalizedState {
        let mut builder = StateBuilder::default();
        for recognizer in &self.recognizers {
            recognizer.recognize(input, &mut builder);
        }
        builder.finish(input)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::standard()
    }
}

static STANDARD: Lazy<Normalizer> = Lazy::new(Normalizer::standard);

/// Normalize with the standard recognizers.
pub fn normalize(input: &str) -> NormalizedState {
    STANDARD.normalize(input)
}

/// All equivalent rewrites of `value`; `{value}` itself when nothing is recognized.
pub fn expand(value: &str) -> BTreeSet<String> {
    normalize(value).expand()
}
