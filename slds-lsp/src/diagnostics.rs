//! Diagnostics for one analyzed document
//!
//! Every finding keeps the items it was built from so code actions can be
//! derived from the same report later.

use crate::convert::{to_lsp_range, PositionEncoder};
use lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};
use slds_analysis::{Action, ActionType, ComponentOverride, Item, Recommendation, Report};
use slds_parser::{InputKind, Range};
use std::collections::BTreeMap;

pub const SOURCE: &str = "SLDS";

/// Diagnostic codes, sent as the decimal ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticCode {
    InvalidTokens,
    AlternativeTokens,
    UtilityTokens,
    ComponentOverride,
    MobileSlds,
}

impl DiagnosticCode {
    const ALL: [DiagnosticCode; 5] = [
        DiagnosticCode::InvalidTokens,
        DiagnosticCode::AlternativeTokens,
        DiagnosticCode::UtilityTokens,
        DiagnosticCode::ComponentOverride,
        DiagnosticCode::MobileSlds,
    ];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn severity(self) -> DiagnosticSeverity {
        match self {
            DiagnosticCode::InvalidTokens | DiagnosticCode::UtilityTokens => {
                DiagnosticSeverity::ERROR
            }
            DiagnosticCode::AlternativeTokens => DiagnosticSeverity::INFORMATION,
            DiagnosticCode::ComponentOverride | DiagnosticCode::MobileSlds => {
                DiagnosticSeverity::WARNING
            }
        }
    }

    /// The code carried by a diagnostic, if it is one of ours.
    pub fn of(diagnostic: &Diagnostic) -> Option<Self> {
        if diagnostic.source.as_deref() != Some(SOURCE) {
            return None;
        }
        match diagnostic.code.as_ref()? {
            NumberOrString::String(code) => Self::ALL
                .into_iter()
                .find(|candidate| candidate.ordinal().to_string() == *code),
            NumberOrString::Number(code) => Self::ALL
                .into_iter()
                .find(|candidate| i32::try_from(candidate.ordinal()).ok() == Some(*code)),
        }
    }
}

/// A diagnostic and the items behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub diagnostic: Diagnostic,
    pub code: DiagnosticCode,
    pub items: Vec<Item>,
    /// The flagged range as analyzed, before position encoding.
    pub range: Range,
}

impl Finding {
    fn new(code: DiagnosticCode, range: Range, message: String, items: Vec<Item>) -> Self {
        let values: Vec<&str> = items.iter().map(|item| item.value.as_str()).collect();
        let diagnostic = Diagnostic {
            range: to_lsp_range(range),
            severity: Some(code.severity()),
            code: Some(NumberOrString::String(code.ordinal().to_string())),
            source: Some(SOURCE.to_string()),
            message,
            data: Some(serde_json::json!({ "values": values })),
            ..Default::default()
        };
        Self {
            diagnostic,
            code,
            items,
            range,
        }
    }
}

/// `"design token"` for stylesheet actions, `"utility class"` otherwise.
pub(crate) fn subject(action: &Action) -> &'static str {
    if action.file_type == Some(InputKind::Style) {
        "design token"
    } else {
        "utility class"
    }
}

fn plural(count: usize, suffix: &str) -> &str {
    if count > 1 {
        suffix
    } else {
        ""
    }
}

fn invalid(recommendation: &Recommendation, findings: &mut Vec<Finding>) {
    for item in &recommendation.items {
        for action in item
            .actions
            .iter()
            .filter(|action| action.action_type == ActionType::Remove)
        {
            let message = format!(
                "Deprecated, or invalid, {}: \"{}\"",
                subject(action),
                action.name
            );
            findings.push(Finding::new(
                DiagnosticCode::InvalidTokens,
                action.range,
                message,
                vec![item.clone()],
            ));
        }
    }
}

fn alternative_tokens(recommendation: &Recommendation, findings: &mut Vec<Finding>) {
    if recommendation.kind() == InputKind::RuleSet {
        return;
    }
    for item in &recommendation.items {
        let mut by_range: BTreeMap<Range, Vec<&Action>> = BTreeMap::new();
        for action in item
            .actions
            .iter()
            .filter(|action| action.action_type == ActionType::Replace)
        {
            by_range.entry(action.range).or_default().push(action);
        }

        for (range, actions) in by_range {
            let mut lines = vec![format!(
                "Updated design token{} available",
                plural(actions.len(), "s")
            )];
            lines.extend(actions.iter().map(|action| match &action.description {
                Some(description) => format!("\"{}\": {description}", action.name),
                None => format!("\"{}\"", action.name),
            }));
            findings.push(Finding::new(
                DiagnosticCode::AlternativeTokens,
                range,
                lines.join("\n"),
                vec![item.clone()],
            ));
        }
    }
}

fn utility_classes(recommendation: &Recommendation, findings: &mut Vec<Finding>) {
    if recommendation.kind() != InputKind::RuleSet {
        return;
    }
    let mut by_range: BTreeMap<Range, (Vec<&Action>, Vec<Item>)> = BTreeMap::new();
    for item in &recommendation.items {
        for action in item
            .actions
            .iter()
            .filter(|action| action.action_type == ActionType::Replace)
        {
            let (actions, items) = by_range.entry(action.range).or_default();
            actions.push(action);
            if !items.contains(item) {
                items.push(item.clone());
            }
        }
    }

    for (range, (actions, items)) in by_range {
        let mut lines = vec![format!(
            "Utility Class{} available",
            plural(actions.len(), "es")
        )];
        lines.extend(
            actions
                .iter()
                .map(|action| format!("\"{}\"", action.name.replace('.', ""))),
        );
        findings.push(Finding::new(
            DiagnosticCode::UtilityTokens,
            range,
            lines.join("\n"),
            items,
        ));
    }
}

fn mobile(recommendation: &Recommendation, findings: &mut Vec<Finding>) {
    for item in &recommendation.items {
        for action in item
            .actions
            .iter()
            .filter(|action| action.action_type == ActionType::None)
        {
            findings.push(Finding::new(
                DiagnosticCode::MobileSlds,
                action.range,
                action.description.clone().unwrap_or_default(),
                vec![item.clone()],
            ));
        }
    }
}

fn component_override(found: &ComponentOverride) -> Option<Finding> {
    let action = &found.action;
    (action.action_type == ActionType::None).then(|| {
        let message = format!(
            "This selector overrides styles from the existing SLDS class \".{}\".\n\nReplace this class with your own custom class and update the markup accordingly.",
            found.overridden_class
        );
        Finding::new(DiagnosticCode::ComponentOverride, action.range, message, Vec::new())
    })
}

/// Findings for a report, in report order with duplicates removed.
/// Positions keep byte columns.
pub fn findings(report: &Report) -> Vec<Finding> {
    findings_with(report, &PositionEncoder::utf8())
}

/// Findings with positions written by `encoder`.
pub fn findings_with(report: &Report, encoder: &PositionEncoder) -> Vec<Finding> {
    let mut collected = Vec::new();
    for recommendation in &report.recommendations {
        invalid(recommendation, &mut collected);
        utility_classes(recommendation, &mut collected);
        alternative_tokens(recommendation, &mut collected);
        mobile(recommendation, &mut collected);
    }
    collected.extend(report.overrides.iter().filter_map(component_override));

    let mut unique: Vec<Finding> = Vec::with_capacity(collected.len());
    for finding in collected {
        if !unique
            .iter()
            .any(|known| known.diagnostic == finding.diagnostic)
        {
            unique.push(finding);
        }
    }
    for finding in &mut unique {
        finding.diagnostic.range = encoder.range(&report.path, finding.range);
    }
    tracing::debug!(path = %report.path.display(), diagnostics = unique.len(), "diagnostics built");
    unique
}

pub fn diagnostics(report: &Report) -> Vec<Diagnostic> {
    diagnostics_with(report, &PositionEncoder::utf8())
}

pub fn diagnostics_with(report: &Report, encoder: &PositionEncoder) -> Vec<Diagnostic> {
    findings_with(report, encoder)
        .into_iter()
        .map(|finding| finding.diagnostic)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use slds_analysis::testing;
    use slds_analysis::Context;

    fn report(file_name: &str, source: &str) -> Report {
        let bundle = testing::bundle(&[(file_name, source)]);
        testing::runner().run(&bundle.entries()[0], &bundle, &Context::default())
    }

    #[rstest]
    #[case(DiagnosticCode::InvalidTokens, "0", DiagnosticSeverity::ERROR)]
    #[case(DiagnosticCode::AlternativeTokens, "1", DiagnosticSeverity::INFORMATION)]
    #[case(DiagnosticCode::UtilityTokens, "2", DiagnosticSeverity::ERROR)]
    #[case(DiagnosticCode::ComponentOverride, "3", DiagnosticSeverity::WARNING)]
    #[case(DiagnosticCode::MobileSlds, "4", DiagnosticSeverity::WARNING)]
    fn test_codes(
        #[case] code: DiagnosticCode,
        #[case] text: &str,
        #[case] severity: DiagnosticSeverity,
    ) {
        let finding = Finding::new(code, Range::on_line(0, 0, 1), String::new(), Vec::new());
        assert_eq!(
            finding.diagnostic.code,
            Some(NumberOrString::String(text.to_string()))
        );
        assert_eq!(finding.diagnostic.severity, Some(severity));
        assert_eq!(DiagnosticCode::of(&finding.diagnostic), Some(code));
    }

    #[test]
    fn test_foreign_diagnostics_have_no_code() {
        let diagnostic = Diagnostic {
            source: Some("eslint".to_string()),
            code: Some(NumberOrString::String("0".to_string())),
            ..Default::default()
        };
        assert_eq!(DiagnosticCode::of(&diagnostic), None);
    }

    #[test]
    fn test_invalid_design_token() {
        let diagnostics = diagnostics(&report("card.css", ".a {font-size: t(testing);}"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Deprecated, or invalid, design token: \"testing\"");
        assert_eq!(diagnostics[0].source.as_deref(), Some(SOURCE));
        assert_eq!(diagnostics[0].range, to_lsp_range(Range::on_line(0, 15, 25)));
    }

    #[test]
    fn test_utf16_positions() {
        let source = ".café {font-size: t(testing);}";
        let report = report("card.css", source);
        let encoder = PositionEncoder::utf8().with_document(&report.path, source);
        let encoded = diagnostics_with(&report, &encoder);
        assert_eq!(encoded[0].range, to_lsp_range(Range::on_line(0, 18, 28)));
        assert_eq!(diagnostics(&report)[0].range, to_lsp_range(Range::on_line(0, 19, 29)));
    }

    #[test]
    fn test_invalid_utility_class() {
        let diagnostics = diagnostics(&report(
            "card.html",
            "<template>\n  <div class=\"slds-box slds-boxx\"></div>\n</template>",
        ));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Deprecated, or invalid, utility class: \"slds-boxx\""
        );
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::ERROR));
    }

    #[test]
    fn test_alternative_tokens() {
        let diagnostics = diagnostics(&report(
            "card.css",
            ".a {font-size: var(--lwc-fontSizeSmall);}",
        ));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::INFORMATION));
        assert!(diagnostics[0]
            .message
            .starts_with("Updated design token available\n\"fontSize2\""));
    }

    #[test]
    fn test_component_override() {
        let diagnostics = diagnostics(&report("card.css", ".THIS .slds-button { color: red; }"));
        let warning = diagnostics
            .iter()
            .find(|diagnostic| DiagnosticCode::of(diagnostic) == Some(DiagnosticCode::ComponentOverride))
            .expect("override diagnostic");
        assert!(warning.message.contains("\".slds-button\""));
        assert_eq!(warning.range, to_lsp_range(Range::on_line(0, 6, 18)));
    }

    #[test]
    fn test_mobile_description_is_the_message() {
        let diagnostics = diagnostics(&report(
            "card.html",
            "<template>\n    <lightning-datatable></lightning-datatable>\n</template>",
        ));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::WARNING));
        assert!(diagnostics[0]
            .message
            .starts_with("lightning-datatable is known to have issues on mobile devices."));
    }

    #[test]
    fn test_empty_report() {
        assert!(diagnostics(&Report::default()).is_empty());
    }
}
