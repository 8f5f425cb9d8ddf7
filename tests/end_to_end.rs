//! Whole-workspace runs: sources in, editor diagnostics out.

use proptest::prelude::*;
use rstest::rstest;
use slds::{lsp, validate_sources, Context};

const STYLE: &str = ".THIS .title {\n    font-size: var(--lwc-fontSizeSmall);\n    color: t(notAToken);\n}";

fn messages(files: &[(&str, &str)], disabled: &[&str]) -> Vec<String> {
    validate_sources(files, &Context::with_disabled(disabled))
        .expect("bundled data")
        .iter()
        .flat_map(lsp::diagnostics)
        .map(|diagnostic| diagnostic.message)
        .collect()
}

#[test]
fn stylesheet_diagnostics() {
    let found = messages(&[("force-app/lwc/title/title.css", STYLE)], &[]);
    insta::assert_snapshot!(found.join("\n---\n"), @r###"
    Deprecated, or invalid, design token: "notAToken"
    ---
    Updated design token available
    "fontSize2"
    "###);
}

#[rstest]
#[case(&[], 2)]
#[case(&["INVALID"], 1)]
#[case(&["DEPRECATED", "INVALID"], 0)]
#[case(&["GLOBAL"], 0)]
fn flags_narrow_the_report(#[case] disabled: &[&str], #[case] expected: usize) {
    let found = messages(&[("force-app/lwc/title/title.css", STYLE)], disabled);
    assert_eq!(found.len(), expected, "{found:?}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn arbitrary_stylesheets_are_tolerated(source in "[ .:;{}()a-z0-9#%-]{0,80}") {
        let reports = validate_sources(&[("c/card/card.css", &source)], &Context::default())
            .expect("bundled data");
        prop_assert_eq!(reports.len(), 1);
        let lines = source.lines().count().max(1);
        for recommendation in &reports[0].recommendations {
            for action in recommendation.actions() {
                prop_assert!(action.range.start.line < lines);
            }
        }
    }
}
