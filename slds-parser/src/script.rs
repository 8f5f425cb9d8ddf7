//! Script scanning
//!
//! Scripts are not parsed; a logos lexer is enough to skip comments and string
//! literals while tracking brace nesting. Each outermost named function whose
//! body mentions `slds-` becomes one [`Block`]. Recognized headers:
//!
//! - `function name(...) {`
//! - `name(...) {` (methods, including `async`/`get`/`set` prefixes)
//! - `name: function(...) {` and `name = function(...) {`
//! - `name = (...) => {` and `name: (...) => {`
//!
//! Lines mentioning `slds-` outside any such function are reported as blocks
//! with an empty function name.

use crate::input::Block;
use crate::range::{Range, SourceLocation};
use logos::Logos;
use std::ops::Range as ByteRange;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum JsToken {
    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*", block_comment)]
    BlockComment,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    #[regex(r"`([^`\\]|\\.)*`")]
    Str,
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,
    #[token("{")]
    Open,
    #[token("}")]
    Close,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("=>")]
    Arrow,
    #[token("=")]
    Assign,
    #[token(":")]
    Colon,
    #[regex(r"\s+")]
    Whitespace,
    #[token("/")]
    Slash,
    #[regex(r#"[^A-Za-z_$\s{}()'"`=:/]+"#)]
    Punct,
}

fn block_comment(lex: &mut logos::Lexer<JsToken>) {
    let rest = lex.remainder();
    let end = rest.find("*/").map_or(rest.len(), |at| at + 2);
    lex.bump(end);
}

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "with", "function", "return", "typeof",
];

const MARKER: &str = "slds-";

struct Frame {
    name: Option<String>,
    start: usize,
}

pub fn parse(source: &str) -> Vec<Block> {
    let tokens: Vec<(JsToken, ByteRange<usize>)> = JsToken::lexer(source)
        .spanned()
        .map(|(kind, span)| (kind.unwrap_or(JsToken::Punct), span))
        .filter(|(kind, _)| {
            !matches!(
                kind,
                JsToken::Whitespace | JsToken::LineComment | JsToken::BlockComment
            )
        })
        .collect();

    let locator = SourceLocation::new(source);
    let mut blocks = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for (index, (kind, span)) in tokens.iter().enumerate() {
        match kind {
            JsToken::Open => {
                let header = function_header(source, &tokens, index);
                stack.push(match header {
                    Some((name, start)) => Frame {
                        name: Some(name),
                        start,
                    },
                    None => Frame {
                        name: None,
                        start: span.start,
                    },
                });
            }
            JsToken::Close => {
                let Some(frame) = stack.pop() else {
                    continue;
                };
                let Some(name) = frame.name else {
                    continue;
                };
                if stack.iter().any(|outer| outer.name.is_some()) {
                    continue;
                }
                let value = &source[frame.start..span.end];
                if value.contains(MARKER) {
                    let range = locator.byte_range(&(frame.start..span.end));
                    blocks.push(Block {
                        function_name: name,
                        value: value.to_string(),
                        line_number: range.start.line,
                        range,
                    });
                }
            }
            _ => {}
        }
    }

    let covered: Vec<Range> = blocks.iter().map(|block| block.range).collect();
    for (line_number, line) in source.lines().enumerate() {
        if !line.contains(MARKER) {
            continue;
        }
        if covered
            .iter()
            .any(|range| range.start.line <= line_number && line_number <= range.end.line)
        {
            continue;
        }
        blocks.push(Block {
            function_name: String::new(),
            value: line.to_string(),
            line_number,
            range: Range::on_line(line_number, 0, line.len()),
        });
    }

    blocks.sort_by_key(|block| block.range);
    blocks
}

/// Name and start offset of the function whose body opens at `open`, if any.
fn function_header(
    source: &str,
    tokens: &[(JsToken, ByteRange<usize>)],
    open: usize,
) -> Option<(String, usize)> {
    let kind_at = |index: usize| tokens.get(index).map(|(kind, _)| *kind);
    let text_at = |index: usize| tokens.get(index).map(|(_, span)| &source[span.clone()]);

    let mut close = open.checked_sub(1)?;
    let arrow = kind_at(close) == Some(JsToken::Arrow);
    if arrow {
        close = close.checked_sub(1)?;
    }
    if kind_at(close) != Some(JsToken::ParenClose) {
        return None;
    }

    let mut depth = 0usize;
    let mut paren = close;
    loop {
        match kind_at(paren)? {
            JsToken::ParenClose => depth += 1,
            JsToken::ParenOpen => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        paren = paren.checked_sub(1)?;
    }

    let before = paren.checked_sub(1)?;
    let assigned_name = |at: usize| -> Option<(String, usize)> {
        let separator = kind_at(at)?;
        if separator != JsToken::Assign && separator != JsToken::Colon {
            return None;
        }
        let name_index = at.checked_sub(1)?;
        match kind_at(name_index)? {
            JsToken::Ident | JsToken::Str => {
                let name = text_at(name_index)?.trim_matches(|c| c == '\'' || c == '"');
                Some((name.to_string(), tokens[name_index].1.start))
            }
            _ => None,
        }
    };

    if arrow {
        return assigned_name(before);
    }

    match (kind_at(before)?, text_at(before)?) {
        (JsToken::Ident, "function") => assigned_name(before.checked_sub(1)?),
        (JsToken::Ident, name) if !CONTROL_KEYWORDS.contains(&name) => {
            let start = match before.checked_sub(1).map(|i| (kind_at(i), text_at(i))) {
                Some((Some(JsToken::Ident), Some("function"))) => tokens[before - 1].1.start,
                _ => tokens[before].1.start,
            };
            Some((name.to_string(), start))
        }
        _ => None,
    }
}
