//! Markup scanning
//!
//! A single forward pass over the bytes of a template builds a flat arena of
//! [`HtmlElement`]s linked by parent/child indices. Index `0` is a synthetic
//! root that owns every top-level element. The scanner understands comments,
//! void and self-closing elements, raw-text elements (`script`, `style`),
//! quoted, unquoted and `{binding}` attribute values. Mismatched closing tags
//! close everything opened after the matching element; unknown closing tags
//! are ignored.
//!
//! Class attributes are split into [`ClassName`]s with their own ranges. For
//! expression values (`{!'slds-a ' + v.b}`) only the quoted literals inside
//! the expression contribute class names.

use crate::input::{Attribute, ClassName, HtmlElement};
use crate::range::{Range, SourceLocation};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Element tree of one markup document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    elements: Vec<HtmlElement>,
}

impl Markup {
    pub const ROOT: usize = 0;

    pub fn root(&self) -> &HtmlElement {
        &self.elements[Self::ROOT]
    }

    pub fn get(&self, id: usize) -> Option<&HtmlElement> {
        self.elements.get(id)
    }

    /// Every element in document order, without the synthetic root.
    pub fn elements(&self) -> impl Iterator<Item = &HtmlElement> {
        self.elements.iter().skip(1)
    }

    pub fn parent(&self, element: &HtmlElement) -> Option<&HtmlElement> {
        element.parent.and_then(|id| self.get(id))
    }

    pub fn children<'a>(
        &'a self,
        element: &'a HtmlElement,
    ) -> impl Iterator<Item = &'a HtmlElement> + 'a {
        element.children.iter().filter_map(move |id| self.get(*id))
    }

    /// Ancestors from the direct parent upwards, excluding the synthetic root.
    pub fn ancestors<'a>(&'a self, element: &'a HtmlElement) -> Vec<&'a HtmlElement> {
        let mut result = Vec::new();
        let mut current = self.parent(element);
        while let Some(parent) = current {
            if parent.id == Self::ROOT {
                break;
            }
            result.push(parent);
            current = self.parent(parent);
        }
        result
    }

    /// Descendants in document order.
    pub fn descendants<'a>(&'a self, element: &'a HtmlElement) -> Vec<&'a HtmlElement> {
        let mut result = Vec::new();
        let mut stack: Vec<&HtmlElement> = self.children(element).collect();
        stack.reverse();
        while let Some(next) = stack.pop() {
            result.push(next);
            let mut children: Vec<&HtmlElement> = self.children(next).collect();
            children.reverse();
            stack.extend(children);
        }
        result
    }

    pub fn find_by_id(&self, id_attribute: &str) -> Option<&HtmlElement> {
        self.elements()
            .find(|element| element.attribute_value("id") == Some(id_attribute))
    }
}

pub fn parse(source: &str) -> Markup {
    let locator = SourceLocation::new(source);
    let root = HtmlElement {
        id: Markup::ROOT,
        tag: String::new(),
        attributes: Vec::new(),
        classes: Vec::new(),
        range: locator.byte_range(&(0..source.len())),
        name_range: Range::default(),
        parent: None,
        children: Vec::new(),
    };
    let mut scanner = Scanner {
        source,
        bytes: source.as_bytes(),
        pos: 0,
        locator,
        elements: vec![root],
        stack: Vec::new(),
    };
    scanner.run();
    Markup {
        elements: scanner.elements,
    }
}

struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    locator: SourceLocation,
    elements: Vec<HtmlElement>,
    stack: Vec<usize>,
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b':' | b'_' | b'.')
}

impl<'a> Scanner<'a> {
    fn at(&self, pattern: &[u8]) -> bool {
        self.bytes[self.pos..].starts_with(pattern)
    }

    fn find_from(&self, from: usize, pattern: &str) -> Option<usize> {
        self.source
            .get(from..)
            .and_then(|rest| rest.find(pattern))
            .map(|index| from + index)
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn run(&mut self) {
        let len = self.bytes.len();
        while self.pos < len {
            if self.at(b"<!--") {
                self.pos = self
                    .find_from(self.pos + 4, "-->")
                    .map_or(len, |end| end + 3);
            } else if self.at(b"</") {
                self.close_tag();
            } else if self.at(b"<!") || self.at(b"<?") {
                self.pos = self.find_from(self.pos, ">").map_or(len, |end| end + 1);
            } else if self.bytes[self.pos] == b'<'
                && self
                    .bytes
                    .get(self.pos + 1)
                    .is_some_and(|b| b.is_ascii_alphabetic())
            {
                self.open_tag();
            } else {
                self.pos += 1;
            }
        }

        for id in std::mem::take(&mut self.stack) {
            self.elements[id].range.end = self.locator.byte_to_position(len);
        }
    }

    fn open_tag(&mut self) {
        let start = self.pos;
        self.pos += 1;
        let name_start = self.pos;
        while self.pos < self.bytes.len() && is_name_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let name_end = self.pos;
        let tag = self.source[name_start..name_end].to_string();

        let mut attributes = Vec::new();
        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            if self.pos >= self.bytes.len() {
                break;
            }
            if self.bytes[self.pos] == b'>' {
                self.pos += 1;
                break;
            }
            if self.at(b"/>") {
                self_closing = true;
                self.pos += 2;
                break;
            }
            match self.attribute() {
                Some(attribute) => attributes.push(attribute),
                None => self.pos += 1,
            }
        }

        let id = self.elements.len();
        let parent = self.stack.last().copied().unwrap_or(Markup::ROOT);
        let classes = attributes
            .iter()
            .find(|attribute: &&Attribute| attribute.name.eq_ignore_ascii_case("class"))
            .map(|attribute| self.class_names(attribute))
            .unwrap_or_default();

        let mut end = self.pos;
        let lower = tag.to_ascii_lowercase();
        let is_void = self_closing || VOID_ELEMENTS.contains(&lower.as_str());
        if !is_void && RAW_TEXT_ELEMENTS.contains(&lower.as_str()) {
            let closing = format!("</{}", lower);
            let rest = self.source[self.pos..].to_ascii_lowercase();
            end = match rest.find(&closing) {
                Some(index) => self
                    .find_from(self.pos + index, ">")
                    .map_or(self.bytes.len(), |gt| gt + 1),
                None => self.bytes.len(),
            };
            self.pos = end;
        }

        self.elements.push(HtmlElement {
            id,
            tag,
            attributes,
            classes,
            range: self.locator.byte_range(&(start..end)),
            name_range: self.locator.byte_range(&(name_start..name_end)),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.elements[parent].children.push(id);

        if !is_void && !RAW_TEXT_ELEMENTS.contains(&lower.as_str()) {
            self.stack.push(id);
        }
    }

    fn attribute(&mut self) -> Option<Attribute> {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let byte = self.bytes[self.pos];
            if byte.is_ascii_whitespace() || matches!(byte, b'=' | b'>' | b'/' | b'"' | b'\'') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        let name = self.source[start..self.pos].to_string();

        let checkpoint = self.pos;
        self.skip_whitespace();
        if self.bytes.get(self.pos) != Some(&b'=') {
            self.pos = checkpoint;
            return Some(Attribute {
                name,
                value: None,
                range: self.locator.byte_range(&(start..checkpoint)),
                value_range: None,
                expression: false,
                computed: false,
            });
        }
        self.pos += 1;
        self.skip_whitespace();

        let len = self.bytes.len();
        let (value_start, value_end, computed) = match self.bytes.get(self.pos) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let value_start = self.pos + 1;
                let value_end = self
                    .find_from(value_start, if quote == b'"' { "\"" } else { "'" })
                    .unwrap_or(len);
                self.pos = (value_end + 1).min(len);
                (value_start, value_end, false)
            }
            Some(b'{') => {
                let mut depth = 0usize;
                let mut close = len;
                for index in self.pos..len {
                    match self.bytes[index] {
                        b'{' => depth += 1,
                        b'}' => {
                            depth -= 1;
                            if depth == 0 {
                                close = index;
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                let value_start = self.pos + 1;
                self.pos = (close + 1).min(len);
                (value_start.min(close), close, true)
            }
            _ => {
                let value_start = self.pos;
                while self.pos < len
                    && !self.bytes[self.pos].is_ascii_whitespace()
                    && self.bytes[self.pos] != b'>'
                    && !self.at(b"/>")
                {
                    self.pos += 1;
                }
                (value_start, self.pos, false)
            }
        };

        let value = &self.source[value_start..value_end];
        let trimmed = value.trim_start();
        let expression = computed || trimmed.starts_with("{!") || trimmed.starts_with("{#");
        Some(Attribute {
            name,
            value: Some(value.to_string()),
            range: self.locator.byte_range(&(start..self.pos)),
            value_range: Some(self.locator.byte_range(&(value_start..value_end))),
            expression,
            computed,
        })
    }

    fn class_names(&self, attribute: &Attribute) -> Vec<ClassName> {
        let (Some(value), Some(value_range)) = (&attribute.value, attribute.value_range) else {
            return Vec::new();
        };
        let origin = value_range.start;
        let mut names = Vec::new();
        let mut push_words = |text: &str, offset: usize| {
            for (index, word) in words(text) {
                let from = offset + index;
                names.push(ClassName {
                    name: word.to_string(),
                    range: Range::new(
                        origin.advance(&value[..from]),
                        origin.advance(&value[..from + word.len()]),
                    ),
                });
            }
        };

        if !attribute.expression {
            push_words(value, 0);
        } else if !attribute.computed {
            for (offset, literal) in quoted_literals(value) {
                push_words(literal, offset);
            }
        }
        names
    }

    fn close_tag(&mut self) {
        let start = self.pos;
        self.pos += 2;
        let name_start = self.pos;
        while self.pos < self.bytes.len() && is_name_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let name = self.source[name_start..self.pos].to_string();
        self.pos = self
            .find_from(self.pos, ">")
            .map_or(self.bytes.len(), |gt| gt + 1);

        let Some(depth) = self
            .stack
            .iter()
            .rposition(|id| self.elements[*id].tag.eq_ignore_ascii_case(&name))
        else {
            tracing::debug!(tag = %name, "ignoring unmatched closing tag");
            return;
        };

        let close_start = self.locator.byte_to_position(start);
        let close_end = self.locator.byte_to_position(self.pos);
        for id in self.stack.drain(depth + 1..) {
            self.elements[id].range.end = close_start;
        }
        if let Some(id) = self.stack.pop() {
            self.elements[id].range.end = close_end;
        }
    }
}

/// Whitespace separated words with their byte offsets.
fn words(text: &str) -> Vec<(usize, &str)> {
    let mut result = Vec::new();
    let mut start = None;
    for (index, ch) in text.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(from)) => {
                result.push((from, &text[from..index]));
                start = None;
            }
            (false, None) => start = Some(index),
            _ => {}
        }
    }
    if let Some(from) = start {
        result.push((from, &text[from..]));
    }
    result
}

/// Contents of the quoted string literals in an expression, with their byte offsets.
fn quoted_literals(text: &str) -> Vec<(usize, &str)> {
    let mut result = Vec::new();
    let mut open: Option<(char, usize)> = None;
    for (index, ch) in text.char_indices() {
        match open {
            Some((quote, from)) if ch == quote => {
                result.push((from, &text[from..index]));
                open = None;
            }
            None if ch == '\'' || ch == '"' => open = Some((ch, index + 1)),
            _ => {}
        }
    }
    result
}
