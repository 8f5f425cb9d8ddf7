//! Location conversion between the analysis model and LSP types

use lsp_types::{Position as LspPosition, Range as LspRange, Url};
use slds_parser::{Position, Range};
use std::collections::HashMap;
use std::path::Path;

fn saturate(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

pub(crate) fn to_lsp_position(position: Position) -> LspPosition {
    LspPosition {
        line: saturate(position.line),
        character: saturate(position.column),
    }
}

pub(crate) fn to_lsp_range(range: Range) -> LspRange {
    LspRange {
        start: to_lsp_position(range.start),
        end: to_lsp_position(range.end),
    }
}

/// Lines of one document, split on `\n`.
#[derive(Debug, Clone)]
struct LineIndex<'a> {
    lines: Vec<&'a str>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.split('\n').collect(),
        }
    }

    /// UTF-16 code units before byte `column` of `line`. Columns past the end
    /// of the line count one unit per byte beyond it.
    fn utf16_column(&self, line: usize, column: usize) -> usize {
        let Some(text) = self.lines.get(line) else {
            return column;
        };
        let mut end = column.min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text[..end].encode_utf16().count() + column.saturating_sub(text.len())
    }
}

/// Writes analysis positions, whose columns count bytes, as LSP positions.
///
/// Documents registered with [`PositionEncoder::with_document`] get their
/// columns counted in UTF-16 code units, the protocol's default encoding.
/// Any other document keeps byte columns, which is what a client that
/// negotiated the `utf-8` position encoding expects.
#[derive(Debug, Clone, Default)]
pub struct PositionEncoder<'a> {
    documents: HashMap<&'a Path, LineIndex<'a>>,
}

impl<'a> PositionEncoder<'a> {
    pub fn utf8() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: &'a Path, text: &'a str) -> Self {
        self.documents.insert(path, LineIndex::new(text));
        self
    }

    pub(crate) fn position(&self, path: &Path, position: Position) -> LspPosition {
        match self.documents.get(path) {
            Some(index) => to_lsp_position(Position::new(
                position.line,
                index.utf16_column(position.line, position.column),
            )),
            None => to_lsp_position(position),
        }
    }

    pub(crate) fn range(&self, path: &Path, range: Range) -> LspRange {
        LspRange {
            start: self.position(path, range.start),
            end: self.position(path, range.end),
        }
    }
}

/// Whether `inner` lies within `outer`, ends inclusive.
pub(crate) fn within(outer: &LspRange, inner: &LspRange) -> bool {
    outer.start <= inner.start && inner.end <= outer.end
}

/// The document a related edit applies to. Relative paths name a sibling of
/// `uri` since a bundle is one component directory.
pub(crate) fn related_uri(uri: &Url, path: Option<&Path>) -> Option<Url> {
    let Some(path) = path else {
        return Some(uri.clone());
    };
    if path.is_absolute() {
        return Url::from_file_path(path).ok();
    }
    let file_name = path.file_name()?.to_str()?;
    uri.join(file_name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lsp_range(start: (u32, u32), end: (u32, u32)) -> LspRange {
        LspRange {
            start: LspPosition::new(start.0, start.1),
            end: LspPosition::new(end.0, end.1),
        }
    }

    #[test]
    fn test_range_conversion() {
        let range = to_lsp_range(Range::on_line(3, 4, 9));
        assert_eq!(range, lsp_range((3, 4), (3, 9)));
    }

    #[test]
    fn test_within() {
        let outer = lsp_range((1, 2), (3, 4));
        assert!(within(&outer, &lsp_range((1, 2), (1, 2))));
        assert!(within(&outer, &lsp_range((2, 0), (3, 4))));
        assert!(!within(&outer, &lsp_range((1, 1), (1, 5))));
        assert!(!within(&outer, &lsp_range((3, 0), (3, 5))));
    }

    #[test]
    fn test_related_uri() {
        let uri = Url::parse("file:///work/card/card.css").expect("uri");
        let sibling = related_uri(&uri, Some(Path::new("force-app/card/card.html")));
        assert_eq!(sibling.expect("sibling").as_str(), "file:///work/card/card.html");
        assert_eq!(related_uri(&uri, None), Some(uri.clone()));
    }

    #[test]
    fn test_utf16_columns() {
        let path = Path::new("card/card.html");
        let text = "<p>é</p>\n<p title=\"😀\" class=\"a\"></p>";
        let encoder = PositionEncoder::utf8().with_document(path, text);

        // `é` is two bytes and one code unit
        assert_eq!(encoder.position(path, Position::new(0, 5)), LspPosition::new(0, 4));
        // the emoji is four bytes and two code units
        let class = text.lines().nth(1).expect("line").find("class").expect("class");
        assert_eq!(class, 16);
        assert_eq!(encoder.position(path, Position::new(1, class)), LspPosition::new(1, 14));
        assert_eq!(encoder.position(path, Position::new(5, 3)), LspPosition::new(5, 3));
    }

    #[test]
    fn test_unregistered_documents_keep_byte_columns() {
        let encoder = PositionEncoder::utf8().with_document(Path::new("a.css"), "é {}");
        let range = encoder.range(Path::new("b.css"), Range::on_line(0, 2, 4));
        assert_eq!(range, lsp_range((0, 2), (0, 4)));
    }

    #[test]
    fn test_column_inside_a_character_snaps_back() {
        let path = Path::new("a.css");
        let encoder = PositionEncoder::utf8().with_document(path, "é");
        assert_eq!(encoder.position(path, Position::new(0, 1)), LspPosition::new(0, 0));
        assert_eq!(encoder.position(path, Position::new(0, 4)), LspPosition::new(0, 3));
    }

    proptest! {
        #[test]
        fn prop_converted_ranges_contain_themselves(
            line in 0usize..10_000,
            start in 0usize..500,
            width in 0usize..500,
        ) {
            let range = to_lsp_range(Range::on_line(line, start, start + width));
            prop_assert!(within(&range, &range));
            prop_assert_eq!(range.end.character - range.start.character, width as u32);
        }
    }
}
