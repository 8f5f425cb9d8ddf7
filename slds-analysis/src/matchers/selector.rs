//! Resolving stylesheet selectors to the markup elements they style
//!
//! Selectors are first cleansed of everything that cannot be evaluated
//! against a static template: vendor pseudo elements, interaction states,
//! the component root (`.THIS`, `:host`) and the component class prefix. What
//! remains is parsed into compound selectors joined by combinators and
//! matched right to left over the [`Markup`] arena.

use once_cell::sync::Lazy;
use regex::Regex;
use slds_parser::{EntityType, HtmlElement, Markup};
use std::fmt;

static CLEANSE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)::?-ms[-\w]+",
        r"(?i)::?-webkit[-\w]+",
        r"(?i)::?-moz[-\w]+",
        r"(?i)\.this\b",
        r"(?i):host\b",
        r"(?i):active",
        r"(?i):hover",
        r"(?i):disabled",
        r"(?i):focus(?:-within|-visible)?",
        r"(?i):checked",
        r"(?i):link",
        r"(?i):visited",
        r"(?i)::?before",
        r"(?i)::?after",
        r"(?i)::selection",
        r"(?i):vertical",
        r"(?i):horizontal",
        r"(?i):first-letter",
        r"\n",
        r"(?i):not\([:\w]*\)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

const CHILD_OR_TYPE_PSEUDOS: &[&str] = &[
    ":first-child",
    ":first-of-type",
    ":last-child",
    ":last-of-type",
    ":nth-child",
    ":nth-last-child",
    ":nth-last-of-type",
    ":nth-of-type",
    ":only-of-type",
    ":only-child",
];

/// Removes the parts of a selector that do not depend on the template.
pub fn cleanse(selector: &str) -> String {
    CLEANSE
        .iter()
        .fold(selector.to_string(), |text, pattern| {
            pattern.replace_all(&text, "").into_owned()
        })
        .trim()
        .to_string()
}

/// Drops the first `.cName` class naming the component itself.
fn strip_component_class(query: &str, component_name: &str) -> String {
    let mut chars = component_name.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => return query.trim().to_string(),
    };
    match Regex::new(&format!(r"(?i)\.c{}", regex::escape(&capitalized))) {
        Ok(pattern) => pattern.replacen(query, 1, "").trim().to_string(),
        Err(_) => query.trim().to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported selector: {}", self.0)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    Adjacent,
    Sibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttributeTest {
    Exists,
    Equals(String),
    Includes(String),
    DashMatch(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

/// `an+b`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Nth {
    step: i64,
    offset: i64,
}

impl Nth {
    fn parse(text: &str) -> Option<Self> {
        let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let text = text.to_ascii_lowercase();
        match text.as_str() {
            "odd" => return Some(Self { step: 2, offset: 1 }),
            "even" => return Some(Self { step: 2, offset: 0 }),
            _ => {}
        }
        match text.split_once('n') {
            None => text.parse().ok().map(|offset| Self { step: 0, offset }),
            Some((step, offset)) => {
                let step = match step {
                    "" | "+" => 1,
                    "-" => -1,
                    other => other.parse().ok()?,
                };
                let offset = if offset.is_empty() { 0 } else { offset.parse().ok()? };
                Some(Self { step, offset })
            }
        }
    }

    /// `position` is 1-based.
    fn matches(&self, position: usize) -> bool {
        let position = position as i64;
        if self.step == 0 {
            return position == self.offset;
        }
        let distance = position - self.offset;
        distance % self.step == 0 && distance / self.step >= 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pseudo {
    NthChild(Nth),
    NthLastChild(Nth),
    NthOfType(Nth),
    NthLastOfType(Nth),
    OnlyChild,
    OnlyOfType,
    Empty,
    Not(Box<Compound>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attributes: Vec<(String, AttributeTest)>,
    pseudos: Vec<Pseudo>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.ids.is_empty()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudos.is_empty()
    }
}

/// A parsed complex selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Left to right; the first combinator is unused.
    parts: Vec<(Combinator, Compound)>,
}

struct Parser<'a> {
    text: &'a str,
    chars: Vec<char>,
    at: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.chars().collect(),
            at: 0,
        }
    }

    fn error(&self) -> ParseError {
        ParseError(self.text.to_string())
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.at).copied()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.at;
        while self.peek().is_some_and(char::is_whitespace) {
            self.at += 1;
        }
        self.at > start
    }

    fn identifier(&mut self) -> Result<String, ParseError> {
        let start = self.at;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                self.at += 1;
            } else if c == '\\' && self.at + 1 < self.chars.len() {
                self.at += 2;
            } else {
                break;
            }
        }
        if self.at == start {
            return Err(self.error());
        }
        Ok(self.chars[start..self.at]
            .iter()
            .filter(|c| **c != '\\')
            .collect())
    }

    fn until(&mut self, close: char) -> Result<String, ParseError> {
        let start = self.at;
        let mut depth = 0;
        while let Some(c) = self.peek() {
            if c == '(' {
                depth += 1;
            } else if c == close && depth == 0 {
                let inner = self.chars[start..self.at].iter().collect();
                self.at += 1;
                return Ok(inner);
            } else if c == ')' {
                depth -= 1;
            }
            self.at += 1;
        }
        Err(self.error())
    }

    fn query(mut self) -> Result<Query, ParseError> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;
        self.skip_whitespace();
        loop {
            let compound = self.compound()?;
            if compound.is_empty() {
                return Err(self.error());
            }
            parts.push((combinator, compound));

            let spaced = self.skip_whitespace();
            let explicit = match self.peek() {
                None => break,
                Some('>') => Some(Combinator::Child),
                Some('+') => Some(Combinator::Adjacent),
                Some('~') => Some(Combinator::Sibling),
                Some(_) if spaced => None,
                Some(_) => return Err(self.error()),
            };
            combinator = match explicit {
                Some(explicit) => {
                    self.at += 1;
                    self.skip_whitespace();
                    explicit
                }
                None => Combinator::Descendant,
            };
        }
        Ok(Query { parts })
    }

    fn compound(&mut self) -> Result<Compound, ParseError> {
        let mut compound = Compound::default();
        if self.peek() == Some('*') {
            self.at += 1;
        } else if self.peek().is_some_and(|c| c.is_alphabetic()) {
            let mut tag = self.identifier()?;
            if self.peek() == Some('|') {
                self.at += 1;
                tag = format!("{tag}:{}", self.identifier()?);
            }
            compound.tag = Some(tag.to_ascii_lowercase());
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.at += 1;
                    compound.classes.push(self.identifier()?);
                }
                '#' => {
                    self.at += 1;
                    compound.ids.push(self.identifier()?);
                }
                '[' => {
                    self.at += 1;
                    let inner = self.until(']')?;
                    compound.attributes.push(self.attribute(&inner)?);
                }
                ':' => {
                    self.at += 1;
                    compound.pseudos.push(self.pseudo()?);
                }
                _ => break,
            }
        }
        Ok(compound)
    }

    fn attribute(&self, inner: &str) -> Result<(String, AttributeTest), ParseError> {
        let operators = ["~=", "|=", "^=", "$=", "*=", "="];
        let found = operators
            .iter()
            .filter_map(|operator| inner.find(operator).map(|at| (at, *operator)))
            .min_by_key(|(at, operator)| (*at, std::cmp::Reverse(operator.len())));
        let Some((at, operator)) = found else {
            let name = inner.trim();
            if name.is_empty() {
                return Err(self.error());
            }
            return Ok((name.to_ascii_lowercase(), AttributeTest::Exists));
        };
        let name = inner[..at].trim().to_ascii_lowercase();
        let value = inner[at + operator.len()..]
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string();
        let test = match operator {
            "~=" => AttributeTest::Includes(value),
            "|=" => AttributeTest::DashMatch(value),
            "^=" => AttributeTest::Prefix(value),
            "$=" => AttributeTest::Suffix(value),
            "*=" => AttributeTest::Substring(value),
            _ => AttributeTest::Equals(value),
        };
        Ok((name, test))
    }

    fn pseudo(&mut self) -> Result<Pseudo, ParseError> {
        let name = self.identifier()?.to_ascii_lowercase();
        let argument = if self.peek() == Some('(') {
            self.at += 1;
            Some(self.until(')')?)
        } else {
            None
        };
        let nth = |argument: Option<&String>| {
            argument
                .and_then(|text| Nth::parse(text))
                .ok_or_else(|| self.error())
        };
        let first = Nth { step: 0, offset: 1 };
        Ok(match (name.as_str(), argument.as_ref()) {
            ("first-child", None) => Pseudo::NthChild(first),
            ("last-child", None) => Pseudo::NthLastChild(first),
            ("only-child", None) => Pseudo::OnlyChild,
            ("first-of-type", None) => Pseudo::NthOfType(first),
            ("last-of-type", None) => Pseudo::NthLastOfType(first),
            ("only-of-type", None) => Pseudo::OnlyOfType,
            ("empty", None) => Pseudo::Empty,
            ("nth-child", argument) => Pseudo::NthChild(nth(argument)?),
            ("nth-last-child", argument) => Pseudo::NthLastChild(nth(argument)?),
            ("nth-of-type", argument) => Pseudo::NthOfType(nth(argument)?),
            ("nth-last-of-type", argument) => Pseudo::NthLastOfType(nth(argument)?),
            ("not", Some(inner)) => {
                let mut parser = Parser::new(inner);
                parser.skip_whitespace();
                let compound = parser.compound()?;
                parser.skip_whitespace();
                if compound.is_empty() || parser.peek().is_some() {
                    return Err(self.error());
                }
                Pseudo::Not(Box::new(compound))
            }
            _ => return Err(self.error()),
        })
    }
}

impl Query {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Parser::new(text).query()
    }

    /// Elements of `markup` matching the query, in document order.
    pub fn select<'a>(&self, markup: &'a Markup) -> Vec<&'a HtmlElement> {
        markup
            .elements()
            .filter(|element| self.matches_at(markup, element, self.parts.len() - 1))
            .collect()
    }

    fn matches_at(&self, markup: &Markup, element: &HtmlElement, index: usize) -> bool {
        let (combinator, compound) = &self.parts[index];
        if !compound_matches(markup, element, compound) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Descendant => markup
                .ancestors(element)
                .into_iter()
                .any(|ancestor| self.matches_at(markup, ancestor, index - 1)),
            Combinator::Child => parent(markup, element)
                .is_some_and(|parent| self.matches_at(markup, parent, index - 1)),
            Combinator::Adjacent => preceding_siblings(markup, element)
                .last()
                .is_some_and(|sibling| self.matches_at(markup, sibling, index - 1)),
            Combinator::Sibling => preceding_siblings(markup, element)
                .into_iter()
                .any(|sibling| self.matches_at(markup, sibling, index - 1)),
        }
    }
}

fn parent<'a>(markup: &'a Markup, element: &HtmlElement) -> Option<&'a HtmlElement> {
    markup
        .parent(element)
        .filter(|parent| parent.id != Markup::ROOT)
}

fn siblings<'a>(markup: &'a Markup, element: &HtmlElement) -> Vec<&'a HtmlElement> {
    match markup.parent(element) {
        Some(parent) => markup.children(parent).collect(),
        None => Vec::new(),
    }
}

fn preceding_siblings<'a>(markup: &'a Markup, element: &HtmlElement) -> Vec<&'a HtmlElement> {
    siblings(markup, element)
        .into_iter()
        .take_while(|sibling| sibling.id != element.id)
        .collect()
}

/// 1-based position of `element` among `candidates`, counted from either end.
fn position(candidates: &[&HtmlElement], element: &HtmlElement, from_end: bool) -> usize {
    let index = candidates
        .iter()
        .position(|candidate| candidate.id == element.id)
        .unwrap_or_default();
    if from_end {
        candidates.len() - index
    } else {
        index + 1
    }
}

fn compound_matches(markup: &Markup, element: &HtmlElement, compound: &Compound) -> bool {
    if compound
        .tag
        .as_deref()
        .is_some_and(|tag| !element.tag.eq_ignore_ascii_case(tag))
    {
        return false;
    }
    if !compound
        .ids
        .iter()
        .all(|id| element.attribute_value("id") == Some(id.as_str()))
    {
        return false;
    }
    if !compound.classes.iter().all(|class| element.has_class(class)) {
        return false;
    }
    if !compound
        .attributes
        .iter()
        .all(|(name, test)| attribute_matches(element, name, test))
    {
        return false;
    }
    compound.pseudos.iter().all(|pseudo| {
        let all = siblings(markup, element);
        let same_type: Vec<&HtmlElement> = all
            .iter()
            .copied()
            .filter(|sibling| sibling.tag.eq_ignore_ascii_case(&element.tag))
            .collect();
        match pseudo {
            Pseudo::NthChild(nth) => nth.matches(position(&all, element, false)),
            Pseudo::NthLastChild(nth) => nth.matches(position(&all, element, true)),
            Pseudo::NthOfType(nth) => nth.matches(position(&same_type, element, false)),
            Pseudo::NthLastOfType(nth) => nth.matches(position(&same_type, element, true)),
            Pseudo::OnlyChild => all.len() == 1,
            Pseudo::OnlyOfType => same_type.len() == 1,
            Pseudo::Empty => element.children.is_empty(),
            Pseudo::Not(inner) => !compound_matches(markup, element, inner),
        }
    })
}

fn attribute_matches(element: &HtmlElement, name: &str, test: &AttributeTest) -> bool {
    let Some(attribute) = element.attribute(name) else {
        return false;
    };
    let value = attribute.value.as_deref().unwrap_or_default();
    match test {
        AttributeTest::Exists => true,
        AttributeTest::Equals(expected) => value == expected,
        AttributeTest::Includes(expected) => value.split_whitespace().any(|word| word == expected),
        AttributeTest::DashMatch(expected) => {
            value == expected || value.starts_with(&format!("{expected}-"))
        }
        AttributeTest::Prefix(expected) => !expected.is_empty() && value.starts_with(expected),
        AttributeTest::Suffix(expected) => !expected.is_empty() && value.ends_with(expected),
        AttributeTest::Substring(expected) => !expected.is_empty() && value.contains(expected),
    }
}

fn is_repeated(entity: EntityType, element: &HtmlElement) -> bool {
    let tag = element.tag.to_ascii_lowercase();
    match entity {
        EntityType::Aura => tag == "aura:iteration",
        EntityType::Lwc => {
            tag == "template"
                && ((element.attribute("for:each").is_some()
                    && element.attribute("for:item").is_some())
                    || element.attribute("iterator:it").is_some())
        }
        EntityType::Other => false,
    }
}

/// Positional pseudo classes cannot be resolved for elements repeated by an iteration.
fn is_static_match(entity: EntityType, markup: &Markup, element: &HtmlElement, query: &str) -> bool {
    if !query.contains(':') {
        return true;
    }
    let positional = query
        .split_whitespace()
        .any(|part| CHILD_OR_TYPE_PSEUDOS.iter().any(|pseudo| part.contains(pseudo)));
    !positional
        || !markup
            .ancestors(element)
            .into_iter()
            .any(|ancestor| is_repeated(entity, ancestor))
}

/// The top-level elements a component root selector (`.THIS`, `:host`) styles.
fn root_elements(markup: &Markup) -> Vec<&HtmlElement> {
    let mut result = Vec::new();
    for top in markup.children(markup.root()) {
        let tag = top.tag.to_ascii_lowercase();
        if tag == "template" || tag == "aura:component" {
            result.extend(
                markup
                    .children(top)
                    .filter(|child| !child.tag.to_ascii_lowercase().starts_with("aura:")),
            );
        } else if !tag.starts_with("aura:") {
            result.push(top);
        }
    }
    result
}

/// Elements of `markup` styled by `selector` in the stylesheet of `component_name`.
pub fn select<'a>(
    selector: &str,
    markup: &'a Markup,
    component_name: &str,
    entity: EntityType,
) -> Vec<&'a HtmlElement> {
    let query = strip_component_class(&cleanse(selector), component_name);
    if query.is_empty() {
        return root_elements(markup);
    }
    match Query::parse(&query) {
        Ok(parsed) => parsed
            .select(markup)
            .into_iter()
            .filter(|element| is_static_match(entity, markup, element, &query))
            .collect(),
        Err(error) => {
            tracing::debug!(%error, "selector skipped");
            Vec::new()
        }
    }
}
