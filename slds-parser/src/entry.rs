//! Analyzed files and component bundles
//!
//! An [`Entry`] is one source file turned into structured inputs, together
//! with what the engine needs to know about its surroundings: the raw lines,
//! the component it belongs to, the framework flavor it is written for and
//! the regions where recommendations are suppressed.

use crate::css;
use crate::input::{AnnotationType, Block, HtmlElement, Input, RuleSet};
use crate::markup::{self, Markup};
use crate::range::{Position, Range};
use crate::script;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

static IMPORT_AND_EXPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\s+|^)import\s+|(?:\s+|^)export\s+").unwrap());

static AURA_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^aura:\w+").unwrap());

/// Framework flavor a component is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Lwc,
    Aura,
    #[default]
    Other,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityType::Lwc => "LWC",
            EntityType::Aura => "AURA",
            EntityType::Other => "OTHER",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Style,
    Markup,
    Script,
    Unsupported,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("css") => SourceKind::Style,
            Some("html" | "cmp" | "app" | "evt" | "lib" | "design" | "intf") => SourceKind::Markup,
            Some("js") => SourceKind::Script,
            _ => SourceKind::Unsupported,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub lines: Vec<String>,
    pub inputs: Vec<Input>,
    pub markup: Option<Markup>,
    pub entity_type: EntityType,
    pub component_name: String,
    pub suppressions: Vec<Range>,
}

impl Entry {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_source(path, &source))
    }

    pub fn from_source(path: impl Into<PathBuf>, source: &str) -> Self {
        let path = path.into();
        let kind = SourceKind::from_path(&path);
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        let component_name = component_name(&path);

        let mut annotation_comments = Vec::new();
        let mut markup_tree = None;
        let inputs: Vec<Input> = match kind {
            SourceKind::Style => {
                let sheet = css::parse(source);
                annotation_comments = sheet.annotation_comments;
                sheet.rules.into_iter().map(Input::RuleSet).collect()
            }
            SourceKind::Markup => {
                let tree = markup::parse(source);
                let inputs = tree.elements().cloned().map(Input::HtmlElement).collect();
                markup_tree = Some(tree);
                inputs
            }
            SourceKind::Script => script::parse(source).into_iter().map(Input::Block).collect(),
            SourceKind::Unsupported => Vec::new(),
        };

        let mut entry = Entry {
            path,
            kind,
            lines,
            inputs,
            markup: markup_tree,
            entity_type: EntityType::Other,
            component_name,
            suppressions: Vec::new(),
        };
        entry.entity_type = entry.detect_entity_type();
        entry.suppressions = suppression_ranges(&entry.lines, &annotation_comments);
        tracing::debug!(
            path = %entry.path.display(),
            inputs = entry.inputs.len(),
            entity = %entry.entity_type,
            "scanned entry"
        );
        entry
    }

    pub fn rule_sets(&self) -> impl Iterator<Item = &RuleSet> {
        self.inputs.iter().filter_map(|input| match input {
            Input::RuleSet(rule) => Some(rule),
            _ => None,
        })
    }

    pub fn elements(&self) -> impl Iterator<Item = &HtmlElement> {
        self.inputs.iter().filter_map(|input| match input {
            Input::HtmlElement(element) => Some(element),
            _ => None,
        })
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.inputs.iter().filter_map(|input| match input {
            Input::Block(block) => Some(block),
            _ => None,
        })
    }

    /// Whether a range falls in a suppressed region. Single-line suppressions
    /// (the line after `sldsValidatorIgnoreNextLine`) match on the start line.
    pub fn is_suppressed(&self, range: &Range) -> bool {
        self.suppressions.iter().any(|suppression| {
            suppression.encloses(range)
                || (suppression.is_single_line() && suppression.start.line == range.start.line)
        })
    }

    fn detect_entity_type(&self) -> EntityType {
        match self.kind {
            SourceKind::Script => {
                if self.lines.iter().any(|line| IMPORT_AND_EXPORT.is_match(line)) {
                    EntityType::Lwc
                } else {
                    EntityType::Other
                }
            }
            SourceKind::Markup => {
                let Some(tree) = &self.markup else {
                    return EntityType::Other;
                };
                if tree.elements().any(|element| element.tag == "template") {
                    EntityType::Lwc
                } else if tree.elements().any(|element| AURA_TAG.is_match(&element.tag)) {
                    EntityType::Aura
                } else {
                    EntityType::Other
                }
            }
            SourceKind::Style => {
                let Some(selector) = self
                    .rule_sets()
                    .next()
                    .and_then(|rule| rule.selectors.first())
                else {
                    return EntityType::Other;
                };
                let text = selector.text.as_str();
                let lower = text.to_ascii_lowercase();
                let name = self.component_name.to_ascii_lowercase();
                if text.contains(":host") || (!name.is_empty() && lower.contains(&format!("c-{}", name))) {
                    EntityType::Lwc
                } else if text.contains(".THIS")
                    || (!name.is_empty() && lower.contains(&format!(".c{}", name)))
                {
                    EntityType::Aura
                } else {
                    EntityType::Other
                }
            }
            SourceKind::Unsupported => EntityType::Other,
        }
    }
}

fn component_name(path: &Path) -> String {
    path.parent()
        .and_then(|parent| parent.file_name())
        .or_else(|| path.file_stem())
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Block suppression ranges read from raw lines.
///
/// `sldsValidatorIgnore` opens a region that ends after the next
/// `sldsValidatorAllow`, or at the end of the document. `sldsValidatorIgnoreNextLine`
/// covers the whole following line. Ignore comments that annotate a single
/// declaration are not block suppressions.
fn suppression_ranges(lines: &[String], annotation_comments: &[Range]) -> Vec<Range> {
    let ignore = AnnotationType::Ignore.keyword().unwrap_or_default();
    let ignore_next_line = AnnotationType::IgnoreNextLine.keyword().unwrap_or_default();
    let allow = AnnotationType::Allow.keyword().unwrap_or_default();

    let mut ranges = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        let line = &lines[index];
        let next_line_column = line.find(ignore_next_line);
        let ignore_column = line.find(ignore).filter(|column| Some(*column) != next_line_column);

        if let Some(column) = ignore_column {
            let start = Position::new(index, column);
            let closing = (index..lines.len()).find_map(|candidate| {
                let from = if candidate == index { column } else { 0 };
                lines[candidate][from..]
                    .find(allow)
                    .map(|found| (candidate, from + found + allow.len()))
            });
            let declaration_level = annotation_comments
                .iter()
                .any(|comment| comment.contains(start));
            match closing {
                Some((end_line, end_column)) => {
                    if !declaration_level {
                        ranges.push(Range::new(start, Position::new(end_line, end_column)));
                    }
                    index = end_line + 1;
                }
                None => {
                    if !declaration_level {
                        ranges.push(Range::new(start, Position::MAX));
                        break;
                    }
                    index += 1;
                }
            }
        } else if next_line_column.is_some() {
            ranges.push(Range::new(
                Position::new(index + 1, 0),
                Position::new(index + 1, usize::MAX),
            ));
            index += 2;
        } else {
            index += 1;
        }
    }
    ranges
}

/// The sibling files of one component
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    entries: Vec<Entry>,
}

impl Bundle {
    /// Entries whose own flavor could not be detected inherit the bundle's.
    pub fn new(mut entries: Vec<Entry>) -> Self {
        let entity_type = entries
            .iter()
            .map(|entry| entry.entity_type)
            .find(|kind| *kind != EntityType::Other)
            .unwrap_or(EntityType::Other);
        for entry in &mut entries {
            if entry.entity_type == EntityType::Other {
                entry.entity_type = entity_type;
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entity_type(&self) -> EntityType {
        self.entries
            .iter()
            .map(|entry| entry.entity_type)
            .find(|kind| *kind != EntityType::Other)
            .unwrap_or(EntityType::Other)
    }

    /// Markup documents of the bundle with the entries they came from.
    pub fn markup(&self) -> impl Iterator<Item = (&Entry, &Markup)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.markup.as_ref().map(|tree| (entry, tree)))
    }

    pub fn get(&self, path: &Path) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.path == path)
    }
}
