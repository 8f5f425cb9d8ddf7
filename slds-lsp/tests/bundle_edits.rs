//! Quick fixes that reach into the other files of a component bundle.

use lsp_types::{CodeActionOrCommand, Position, Range, Url};
use slds_analysis::{testing, Context};
use slds_lsp::{code_actions, code_actions_with, diagnostics, findings, DiagnosticCode, PositionEncoder};

const STYLE: &str = ".message { display: none; }";
const MARKUP: &str = "<template>\n  <div class=\"wrapper\">\n    <span class=\"message\">Hi</span>\n  </div>\n</template>";

fn style_report() -> slds_analysis::Report {
    let bundle = testing::bundle(&[("card.css", STYLE), ("card.html", MARKUP)]);
    let runner = testing::runner();
    runner.run(&bundle.entries()[0], &bundle, &Context::default())
}

#[test]
fn utility_class_fix_edits_markup_too() {
    let report = style_report();
    let utility = findings(&report)
        .into_iter()
        .find(|finding| finding.code == DiagnosticCode::UtilityTokens)
        .expect("utility class finding");
    assert_eq!(utility.diagnostic.message, "Utility Class available\n\"slds-hide\"");

    let css = Url::parse("file:///work/card/card.css").expect("uri");
    let html = Url::parse("file:///work/card/card.html").expect("uri");
    let cursor = Range::new(Position::new(0, 3), Position::new(0, 3));
    let actions = code_actions(&report, &css, cursor);

    let fix = actions
        .iter()
        .find_map(|action| match action {
            CodeActionOrCommand::CodeAction(action) => Some(action),
            CodeActionOrCommand::Command(_) => None,
        })
        .expect("utility class fix");
    assert_eq!(fix.title, "Update to utility class 'slds-hide'");
    let changes = fix
        .edit
        .as_ref()
        .and_then(|edit| edit.changes.as_ref())
        .expect("changes");
    assert_eq!(changes[&css].len(), 1);
    assert_eq!(changes[&css][0].new_text, "");

    let insertion = &changes[&html][0];
    assert_eq!(insertion.range, Range::new(Position::new(2, 17), Position::new(2, 17)));
    assert_eq!(insertion.new_text, "slds-hide ");
}

#[test]
fn every_diagnostic_is_tagged() {
    let report = style_report();
    for diagnostic in diagnostics(&report) {
        assert_eq!(diagnostic.source.as_deref(), Some("SLDS"));
        assert!(DiagnosticCode::of(&diagnostic).is_some());
    }
}

#[test]
fn fixes_are_scoped_to_the_cursor() {
    let report = style_report();
    let css = Url::parse("file:///work/card/card.css").expect("uri");
    let far_away = Range::new(Position::new(40, 0), Position::new(40, 0));
    assert!(code_actions(&report, &css, far_away).is_empty());
}

#[test]
fn markup_insertion_counts_utf16_columns() {
    let markup = "<template>\n  <div class=\"wrapper\">\n    <span title=\"née\" class=\"message\">Hi</span>\n  </div>\n</template>";
    let bundle = testing::bundle(&[("card.css", STYLE), ("card.html", markup)]);
    let report = testing::runner().run(&bundle.entries()[0], &bundle, &Context::default());
    let encoder = PositionEncoder::utf8()
        .with_document(&bundle.entries()[0].path, STYLE)
        .with_document(&bundle.entries()[1].path, markup);

    let css = Url::parse("file:///work/card/card.css").expect("uri");
    let html = Url::parse("file:///work/card/card.html").expect("uri");
    let cursor = Range::new(Position::new(0, 3), Position::new(0, 3));
    let actions = code_actions_with(&report, &css, cursor, &encoder);
    let changes = actions
        .iter()
        .find_map(|action| match action {
            CodeActionOrCommand::CodeAction(action) => action.edit.as_ref()?.changes.as_ref(),
            CodeActionOrCommand::Command(_) => None,
        })
        .expect("utility class fix");

    // `é` takes two bytes but a single UTF-16 code unit
    let insertion = &changes[&html][0];
    assert_eq!(insertion.range, Range::new(Position::new(2, 29), Position::new(2, 29)));
    assert_eq!(insertion.new_text, "slds-hide ");
}
