//! Quick fixes for SLDS diagnostics

use crate::convert::{related_uri, within, PositionEncoder};
use crate::diagnostics::{findings_with, subject, DiagnosticCode, Finding};
use lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Position as LspPosition, Range as LspRange,
    TextEdit, Url, WorkspaceEdit,
};
use slds_analysis::{Action, ActionType, RelatedInformation, Report};
use slds_parser::{AnnotationType, InputKind, Range};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

pub const IGNORE_FILE: &str = "Ignore mobile SLDS validation for this file";
pub const IGNORE_LINE: &str = "Ignore mobile SLDS validation for this line";

/// The document fixes are computed for.
struct Target<'a> {
    uri: &'a Url,
    path: &'a Path,
    encoder: &'a PositionEncoder<'a>,
}

impl Target<'_> {
    fn range(&self, range: Range) -> LspRange {
        self.encoder.range(self.path, range)
    }

    /// The document and range a related edit applies to.
    fn related(&self, related: &RelatedInformation) -> Option<(Url, LspRange)> {
        let uri = related_uri(self.uri, related.path.as_deref())?;
        let path = related.path.as_deref().unwrap_or(self.path);
        Some((uri, self.encoder.range(path, related.range)))
    }
}

fn quick_fix(title: String, finding: &Finding, changes: HashMap<Url, Vec<TextEdit>>) -> CodeActionOrCommand {
    CodeActionOrCommand::CodeAction(CodeAction {
        title,
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![finding.diagnostic.clone()]),
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn single_edit(
    title: String,
    finding: &Finding,
    uri: &Url,
    range: LspRange,
    new_text: String,
) -> CodeActionOrCommand {
    let changes = HashMap::from([(uri.clone(), vec![TextEdit { range, new_text }])]);
    quick_fix(title, finding, changes)
}

fn actions_at(finding: &Finding, action_type: ActionType) -> impl Iterator<Item = &Action> {
    let range = finding.range;
    finding
        .items
        .iter()
        .flat_map(|item| item.actions.iter())
        .filter(move |action| action.action_type == action_type && action.range == range)
}

fn remove_invalid(finding: &Finding, target: &Target) -> Vec<CodeActionOrCommand> {
    actions_at(finding, ActionType::Remove)
        .map(|action| {
            single_edit(
                format!("Remove {} '{}'", subject(action), action.name),
                finding,
                target.uri,
                finding.diagnostic.range,
                action.value.clone().unwrap_or_default(),
            )
        })
        .collect()
}

fn update_token(finding: &Finding, target: &Target) -> Vec<CodeActionOrCommand> {
    actions_at(finding, ActionType::Replace)
        .map(|action| {
            single_edit(
                format!("Update token to '{}'", action.name),
                finding,
                target.uri,
                finding.diagnostic.range,
                action.value.clone().unwrap_or_default(),
            )
        })
        .collect()
}

/// One fix per class name: the rule goes away and the class is added
/// wherever related information points.
fn use_utility_class(finding: &Finding, target: &Target) -> Vec<CodeActionOrCommand> {
    let mut by_name: BTreeMap<&str, Vec<&Action>> = BTreeMap::new();
    for action in actions_at(finding, ActionType::Replace) {
        by_name.entry(action.name.as_str()).or_default().push(action);
    }

    by_name
        .into_iter()
        .map(|(name, actions)| {
            let mut changes: HashMap<Url, Vec<TextEdit>> = HashMap::new();
            for related in actions.first().map(|action| &action.related_information).into_iter().flatten() {
                let Some((document, range)) = target.related(related) else {
                    tracing::warn!(path = ?related.path, "related edit has no document");
                    continue;
                };
                changes.entry(document).or_default().push(TextEdit {
                    range,
                    new_text: related.value.clone().unwrap_or_default(),
                });
            }

            let mut removals: Vec<TextEdit> = Vec::new();
            for action in actions {
                let edit = TextEdit {
                    range: target.range(action.range),
                    new_text: String::new(),
                };
                if !removals.contains(&edit) {
                    removals.push(edit);
                }
            }
            changes.entry(target.uri.clone()).or_default().extend(removals);

            quick_fix(
                format!("Update to utility class '{}'", name.replace('.', "")),
                finding,
                changes,
            )
        })
        .collect()
}

fn keyword(annotation: AnnotationType) -> &'static str {
    annotation.keyword().unwrap_or_default()
}

/// Suppression comments: the whole file for markup, the flagged line for both.
fn ignore_mobile(finding: &Finding, target: &Target) -> Vec<CodeActionOrCommand> {
    let mut fixes = Vec::new();
    for action in actions_at(finding, ActionType::None) {
        let is_style = action.file_type == Some(InputKind::Style);
        if !is_style {
            let top = LspRange::new(LspPosition::new(0, 0), LspPosition::new(0, 0));
            fixes.push(single_edit(
                IGNORE_FILE.to_string(),
                finding,
                target.uri,
                top,
                format!("<!-- {} -->\n", keyword(AnnotationType::Ignore)),
            ));
        }

        let anchor = if is_style {
            action
                .related_information
                .first()
                .map(|related| target.range(related.range))
                .unwrap_or(finding.diagnostic.range)
        } else {
            finding.diagnostic.range
        };
        let indent = " ".repeat(anchor.start.character as usize);
        let comment = if is_style {
            format!("/* {} */", keyword(AnnotationType::Ignore))
        } else {
            format!("<!-- {} -->", keyword(AnnotationType::IgnoreNextLine))
        };
        fixes.push(single_edit(
            IGNORE_LINE.to_string(),
            finding,
            target.uri,
            LspRange::new(anchor.start, anchor.start),
            format!("{comment}\n{indent}"),
        ));
    }
    fixes
}

/// Fixes for every finding of `report` whose range contains `range`.
/// Positions keep byte columns.
pub fn code_actions(report: &Report, uri: &Url, range: LspRange) -> Vec<CodeActionOrCommand> {
    code_actions_with(report, uri, range, &PositionEncoder::utf8())
}

/// Fixes with `range` and every edit written in `encoder`'s positions.
pub fn code_actions_with(
    report: &Report,
    uri: &Url,
    range: LspRange,
    encoder: &PositionEncoder,
) -> Vec<CodeActionOrCommand> {
    let target = Target {
        uri,
        path: &report.path,
        encoder,
    };
    findings_with(report, encoder)
        .iter()
        .filter(|finding| within(&finding.diagnostic.range, &range))
        .flat_map(|finding| match finding.code {
            DiagnosticCode::InvalidTokens => remove_invalid(finding, &target),
            DiagnosticCode::AlternativeTokens => update_token(finding, &target),
            DiagnosticCode::UtilityTokens => use_utility_class(finding, &target),
            DiagnosticCode::MobileSlds => ignore_mobile(finding, &target),
            DiagnosticCode::ComponentOverride => Vec::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slds_analysis::testing;
    use slds_analysis::Context;

    fn report(file_name: &str, source: &str) -> Report {
        let bundle = testing::bundle(&[(file_name, source)]);
        testing::runner().run(&bundle.entries()[0], &bundle, &Context::default())
    }

    fn uri(file_name: &str) -> Url {
        Url::parse(&format!("file:///work/card/{file_name}")).expect("uri")
    }

    fn cursor(line: u32, character: u32) -> LspRange {
        LspRange::new(
            LspPosition::new(line, character),
            LspPosition::new(line, character),
        )
    }

    fn titled(actions: &[CodeActionOrCommand]) -> Vec<(&str, &WorkspaceEdit)> {
        actions
            .iter()
            .filter_map(|action| match action {
                CodeActionOrCommand::CodeAction(action) => {
                    Some((action.title.as_str(), action.edit.as_ref()?))
                }
                CodeActionOrCommand::Command(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_remove_invalid_token() {
        let uri = uri("card.css");
        let report = report("card.css", ".a {font-size: t(testing);}");
        let actions = code_actions(&report, &uri, cursor(0, 18));
        let titled = titled(&actions);
        assert_eq!(titled.len(), 1);
        assert_eq!(titled[0].0, "Remove design token 'testing'");
        let edits = &titled[0].1.changes.as_ref().expect("changes")[&uri];
        assert_eq!(edits[0].new_text, "");
    }

    #[test]
    fn test_edits_follow_the_position_encoding() {
        let uri = uri("card.css");
        let source = ".café {font-size: t(testing);}";
        let report = report("card.css", source);
        let encoder = PositionEncoder::utf8().with_document(&report.path, source);
        let actions = code_actions_with(&report, &uri, cursor(0, 20), &encoder);
        let titled = titled(&actions);
        assert_eq!(titled.len(), 1);
        let edits = &titled[0].1.changes.as_ref().expect("changes")[&uri];
        assert_eq!(
            edits[0].range,
            LspRange::new(LspPosition::new(0, 18), LspPosition::new(0, 28))
        );
    }

    #[test]
    fn test_update_token() {
        let uri = uri("card.css");
        let report = report("card.css", ".a {font-size: var(--lwc-fontSizeSmall);}");
        let actions = code_actions(&report, &uri, cursor(0, 20));
        let titled = titled(&actions);
        assert_eq!(titled.len(), 1);
        assert_eq!(titled[0].0, "Update token to 'fontSize2'");
        let edits = &titled[0].1.changes.as_ref().expect("changes")[&uri];
        assert_eq!(edits[0].new_text, "var(--lwc-fontSize2)");
    }

    #[test]
    fn test_cursor_outside_diagnostics() {
        let uri = uri("card.css");
        let report = report("card.css", ".a {font-size: t(testing);}");
        assert!(code_actions(&report, &uri, cursor(0, 2)).is_empty());
    }

    #[test]
    fn test_ignore_mobile_component() {
        let uri = uri("card.html");
        let report = report(
            "card.html",
            "<template>\n    <lightning-datatable></lightning-datatable>\n</template>",
        );
        let actions = code_actions(&report, &uri, cursor(1, 6));
        let titled = titled(&actions);
        let titles: Vec<_> = titled.iter().map(|(title, _)| *title).collect();
        assert_eq!(titles, vec![IGNORE_FILE, IGNORE_LINE]);

        let line = &titled[1].1.changes.as_ref().expect("changes")[&uri][0];
        assert_eq!(line.range, cursor(1, 4));
        assert_eq!(line.new_text, "<!-- sldsValidatorIgnoreNextLine -->\n    ");
    }
}
