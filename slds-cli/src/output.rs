//! Rendering reports for the terminal

use slds_analysis::{Action, ActionType, Report};
use slds_parser::{InputKind, Position};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(name)
    }
}

/// One printable line of a report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Line {
    start: Position,
    severity: Severity,
    message: String,
    related: Vec<String>,
}

fn subject(action: &Action) -> &'static str {
    if action.file_type == Some(InputKind::Style) {
        "design token"
    } else {
        "utility class"
    }
}

fn describe(kind: InputKind, action: &Action) -> (Severity, String) {
    match action.action_type {
        ActionType::Remove => (
            Severity::Error,
            format!("Deprecated, or invalid, {}: \"{}\"", subject(action), action.name),
        ),
        ActionType::Replace if kind == InputKind::RuleSet => (
            Severity::Error,
            format!("Utility class available: \"{}\"", action.name),
        ),
        ActionType::Replace => {
            let message = match &action.value {
                Some(value) => format!("Design token available: \"{}\" ({value})", action.name),
                None => format!("Design token available: \"{}\"", action.name),
            };
            (Severity::Info, message)
        }
        ActionType::None => (
            Severity::Warning,
            action.description.clone().unwrap_or_else(|| action.name.clone()),
        ),
    }
}

/// Editors and terminals count lines and columns from one.
fn location(path: &Path, at: Position) -> String {
    format!("{}:{}:{}", path.display(), at.line + 1, at.column + 1)
}

fn lines(report: &Report, show_related: bool) -> Vec<Line> {
    let mut lines = Vec::new();
    for recommendation in &report.recommendations {
        for action in recommendation.actions() {
            let (severity, message) = describe(recommendation.kind(), action);
            let related = if show_related {
                action
                    .related_information
                    .iter()
                    .map(|related| {
                        let path = related.path.as_deref().unwrap_or(&report.path);
                        format!(
                            "{} insert \"{}\"",
                            location(path, related.range.start),
                            related.value.as_deref().unwrap_or_default()
                        )
                    })
                    .collect()
            } else {
                Vec::new()
            };
            lines.push(Line {
                start: action.range.start,
                severity,
                message,
                related,
            });
        }
    }
    for found in &report.overrides {
        lines.push(Line {
            start: found.action.range.start,
            severity: Severity::Warning,
            message: format!(
                "Selector overrides the SLDS class \".{}\"",
                found.overridden_class
            ),
            related: Vec::new(),
        });
    }
    lines.sort();
    lines.dedup();
    lines
}

/// `path:line:col severity message` lines sorted by path and position,
/// followed by a summary.
pub fn text(reports: &[Report], show_related: bool) -> String {
    let mut ordered: Vec<&Report> = reports.iter().filter(|report| !report.is_empty()).collect();
    ordered.sort_by(|left, right| left.path.cmp(&right.path));

    let mut out = String::new();
    let mut findings = 0;
    for report in &ordered {
        for line in lines(report, show_related) {
            findings += 1;
            out.push_str(&format!(
                "{} {} {}\n",
                location(&report.path, line.start),
                line.severity,
                line.message.replace('\n', " ")
            ));
            for related in line.related {
                out.push_str(&format!("    {related}\n"));
            }
        }
    }

    if findings == 0 {
        out.push_str("No findings\n");
    } else {
        out.push_str(&format!(
            "{findings} finding{} in {} file{}\n",
            if findings == 1 { "" } else { "s" },
            ordered.len(),
            if ordered.len() == 1 { "" } else { "s" },
        ));
    }
    out
}

pub fn json(reports: &[Report]) -> serde_json::Result<String> {
    let with_findings: Vec<&Report> = reports.iter().filter(|report| !report.is_empty()).collect();
    serde_json::to_string_pretty(&with_findings)
}
