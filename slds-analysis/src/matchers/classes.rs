//! Class name occurrences in markup and script

use once_cell::sync::Lazy;
use regex::Regex;
use slds_parser::{Block, HtmlElement, Range};
use std::collections::BTreeMap;

static BEM_MODIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(slds-.*)--(.*)$").unwrap());

static SCRIPT_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"slds-[^\s"';\.,:\)\[]*"#).unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Occurrence {
    pub name: String,
    pub range: Range,
}

pub(crate) fn element_classes(element: &HtmlElement) -> Vec<Occurrence> {
    element
        .classes
        .iter()
        .map(|class| Occurrence {
            name: class.name.clone(),
            range: class.range,
        })
        .collect()
}

pub(crate) fn script_classes(block: &Block) -> Vec<Occurrence> {
    SCRIPT_CLASS
        .find_iter(&block.value)
        .map(|found| Occurrence {
            name: found.as_str().to_string(),
            range: block.value_span_range(found.start(), found.end()),
        })
        .collect()
}

/// The class itself and, for a `--` modifier, its `_` spelling.
pub(crate) fn spellings(name: &str) -> Vec<String> {
    let mut result = vec![name.to_string()];
    if let Some(captures) = BEM_MODIFIER.captures(name) {
        result.push(format!("{}_{}", &captures[1], &captures[2]));
    }
    result
}

/// Occurrences keyed by every spelling they answer to.
pub(crate) fn by_spelling(occurrences: &[Occurrence]) -> BTreeMap<String, Vec<&Occurrence>> {
    let mut result: BTreeMap<String, Vec<&Occurrence>> = BTreeMap::new();
    for occurrence in occurrences {
        for spelling in spellings(&occurrence.name) {
            result.entry(spelling).or_default().push(occurrence);
        }
    }
    result
}
