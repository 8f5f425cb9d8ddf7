//! Stylesheet scanning
//!
//! A logos lexer splits the source into a flat token stream; the assembler then
//! walks it once, building a [`RuleSet`] per rule with one [`Style`] per
//! declaration. Grouping at-rules (`@media`, `@supports`, ...) contribute the
//! rules nested inside them; other at-rule blocks (`@keyframes`, `@font-face`)
//! are skipped whole.
//!
//! The scanner is tolerant: unterminated comments, stray braces and
//! declarations without a colon are dropped instead of failing the file.
//!
//! Validator annotations are read from comments. A comment placed before a
//! selector annotates the rule, a comment placed before a declaration inside a
//! rule body annotates that declaration only. The latter are also reported in
//! [`Stylesheet::annotation_comments`] so block suppression can tell them apart.

use crate::input::{AnnotationType, RuleSet, Selector, Style};
use crate::range::{Range, SourceLocation};
use logos::Logos;
use std::ops::Range as ByteRange;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum CssToken {
    #[token("/*", block_comment)]
    Comment,
    #[token("{")]
    Open,
    #[token("}")]
    Close,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    Str,
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,
    #[token("/")]
    Slash,
    #[regex(r#"[^{};:()"'/ \t\r\n\f]+"#)]
    Text,
}

/// Consumes through the closing `*/`, or to the end of an unterminated comment.
fn block_comment(lex: &mut logos::Lexer<CssToken>) {
    let rest = lex.remainder();
    let end = rest.find("*/").map_or(rest.len(), |at| at + 2);
    lex.bump(end);
}

#[derive(Debug, Clone)]
struct Token {
    kind: CssToken,
    span: ByteRange<usize>,
}

/// Result of scanning one stylesheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<RuleSet>,
    /// Ranges of annotation comments that apply to a single declaration.
    pub annotation_comments: Vec<Range>,
}

pub fn parse(source: &str) -> Stylesheet {
    let tokens = CssToken::lexer(source)
        .spanned()
        .map(|(kind, span)| Token {
            kind: kind.unwrap_or(CssToken::Text),
            span,
        })
        .collect();

    let mut assembler = Assembler {
        source,
        tokens,
        cursor: 0,
        locator: SourceLocation::new(source),
        output: Stylesheet::default(),
    };
    assembler.block(false);
    assembler.output
}

const GROUPING_AT_RULES: &[&str] = &["@media", "@supports", "@container", "@layer", "@document"];

#[derive(Default)]
struct Declaration {
    start: Option<usize>,
    colon: Option<usize>,
    last_end: usize,
    depth: usize,
    annotation: AnnotationType,
    comment: Option<Range>,
}

impl Declaration {
    fn touch(&mut self, span: &ByteRange<usize>) {
        if self.start.is_none() {
            self.start = Some(span.start);
        }
        self.last_end = span.end;
    }
}

struct Assembler<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    cursor: usize,
    locator: SourceLocation,
    output: Stylesheet,
}

impl<'a> Assembler<'a> {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        self.cursor += 1;
        token
    }

    /// Rules until the end of input, or until the `}` closing a grouping at-rule.
    fn block(&mut self, nested: bool) {
        let mut prelude_start: Option<usize> = None;
        let mut annotation = AnnotationType::None;

        while let Some(token) = self.next() {
            match token.kind {
                CssToken::Whitespace => {}
                CssToken::Comment => {
                    if prelude_start.is_none() {
                        let found = AnnotationType::from_comment(&self.source[token.span.clone()]);
                        if found != AnnotationType::None {
                            annotation = found;
                        }
                    }
                }
                CssToken::Close => {
                    if nested {
                        return;
                    }
                    prelude_start = None;
                }
                CssToken::Semicolon => {
                    prelude_start = None;
                    annotation = AnnotationType::None;
                }
                CssToken::Open => {
                    let start = prelude_start.take().unwrap_or(token.span.start);
                    let prelude = self.source[start..token.span.start].trim();
                    if prelude.starts_with('@') {
                        let keyword = prelude
                            .split(|c: char| c.is_whitespace() || c == '(')
                            .next()
                            .unwrap_or_default()
                            .to_ascii_lowercase();
                        if GROUPING_AT_RULES.contains(&keyword.as_str()) {
                            self.block(true);
                        } else {
                            self.skip_block();
                        }
                    } else {
                        self.rule(start, token.span.start, annotation);
                    }
                    annotation = AnnotationType::None;
                }
                _ => {
                    if prelude_start.is_none() {
                        prelude_start = Some(token.span.start);
                    }
                }
            }
        }
    }

    fn skip_block(&mut self) -> usize {
        let mut depth = 1usize;
        while let Some(token) = self.next() {
            match token.kind {
                CssToken::Open => depth += 1,
                CssToken::Close => {
                    depth -= 1;
                    if depth == 0 {
                        return token.span.end;
                    }
                }
                _ => {}
            }
        }
        self.source.len()
    }

    fn rule(&mut self, start: usize, open: usize, annotation: AnnotationType) {
        let selectors = self.selectors(start, open);
        let (styles, end) = self.declarations();
        if selectors.is_empty() {
            tracing::debug!(offset = start, "dropping rule without selectors");
            return;
        }
        self.output.rules.push(RuleSet {
            selectors,
            styles,
            range: self.locator.byte_range(&(start..end)),
            annotation,
        });
    }

    fn selectors(&self, start: usize, end: usize) -> Vec<Selector> {
        let prelude = &self.source[start..end];
        let mut parts = Vec::new();
        let mut depth = 0usize;
        let mut part_start = 0usize;
        for (index, ch) in prelude.char_indices() {
            match ch {
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    parts.push(part_start..index);
                    part_start = index + 1;
                }
                _ => {}
            }
        }
        parts.push(part_start..prelude.len());

        parts
            .into_iter()
            .filter_map(|part| {
                let raw = &prelude[part.clone()];
                let text = raw.trim();
                if text.is_empty() {
                    return None;
                }
                let leading = raw.len() - raw.trim_start().len();
                let from = start + part.start + leading;
                Some(Selector {
                    text: text.to_string(),
                    range: self.locator.byte_range(&(from..from + text.len())),
                })
            })
            .collect()
    }

    /// Declarations of a rule body, returning them with the offset past the closing brace.
    fn declarations(&mut self) -> (Vec<Style>, usize) {
        let mut styles = Vec::new();
        let mut current = Declaration::default();

        while let Some(token) = self.next() {
            match token.kind {
                CssToken::Whitespace => {}
                CssToken::Comment => {
                    if current.start.is_none() {
                        let found = AnnotationType::from_comment(&self.source[token.span.clone()]);
                        if found != AnnotationType::None {
                            current.annotation = found;
                            current.comment = Some(self.locator.byte_range(&token.span));
                        }
                    }
                }
                CssToken::ParenOpen => {
                    current.touch(&token.span);
                    current.depth += 1;
                }
                CssToken::ParenClose => {
                    current.touch(&token.span);
                    current.depth = current.depth.saturating_sub(1);
                }
                CssToken::Colon => {
                    current.touch(&token.span);
                    if current.colon.is_none() && current.depth == 0 {
                        current.colon = Some(token.span.start);
                    }
                }
                CssToken::Semicolon if current.depth == 0 => {
                    let finished = std::mem::take(&mut current);
                    if let Some(style) = self.finish(finished, Some(token.span.end)) {
                        styles.push(style);
                    }
                }
                CssToken::Open => {
                    // nested rule bodies are not analyzed
                    self.skip_block();
                    current = Declaration::default();
                }
                CssToken::Close => {
                    let finished = std::mem::take(&mut current);
                    if let Some(style) = self.finish(finished, None) {
                        styles.push(style);
                    }
                    return (styles, token.span.end);
                }
                _ => current.touch(&token.span),
            }
        }

        if let Some(style) = self.finish(current, None) {
            styles.push(style);
        }
        (styles, self.source.len())
    }

    fn finish(&mut self, declaration: Declaration, terminator: Option<usize>) -> Option<Style> {
        let start = declaration.start?;
        let colon = declaration.colon?;
        let value_end = declaration.last_end.max(colon + 1);
        let raw = &self.source[colon + 1..value_end];
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        let property = self.source[start..colon].trim();
        if property.is_empty() {
            return None;
        }
        let value_start = colon + 1 + (raw.len() - raw.trim_start().len());
        let value_stop = value_start + value.len();
        let end = terminator.unwrap_or(value_stop);

        if let Some(comment) = declaration.comment {
            self.output.annotation_comments.push(comment);
        }

        Some(Style {
            property: property.to_string(),
            value: value.to_string(),
            range: self.locator.byte_range(&(start..end)),
            value_range: self.locator.byte_range(&(value_start..value_stop)),
            annotation: declaration.annotation,
        })
    }
}
