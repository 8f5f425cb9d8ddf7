//! Mobile readiness heuristics
//!
//! None of these propose an edit. Every action is informational and carries
//! the reason in its description.

use super::{entry_styles, Matcher};
use crate::catalog::{ComponentRegistry, TokenCatalog};
use crate::context::{Context, ContextKey};
use crate::model::{Action, Item, Recommendation, RelatedInformation};
use crate::normalizer::number;
use crate::normalizer::token;
use once_cell::sync::Lazy;
use regex::Regex;
use slds_parser::{Bundle, EntityType, Entry, HtmlElement, InputKind, Markup, Range, Style};
use std::collections::HashSet;
use std::sync::Arc;

pub const USE_FONT_SIZE_4_OR_LARGER: &str =
    "For best readability on mobile devices, consider using fontSize4 or larger.";
pub const USE_14PX_OR_LARGER: &str =
    "For best readability on mobile devices, consider using 14px or larger.";
pub const AVOID_TRUNCATION: &str =
    "On a mobile device, a long label can exceed the screen width if it's prevented from wrapping.";
pub const REQUIRE_LABELS: &str =
    "Clickable images, Lightning button icons, and form elements require labels for mobile users.";

const MOBILE_CSS: &str = "Mobile SLDS CSS";
const MINIMUM_PIXELS: f64 = 14.0;

const REQUIRING_LABELS: &[&str] = &[
    "lightning-button-icon",
    "input",
    "select",
    "textarea",
    "button",
    "fieldset",
    "legend",
    "datalist",
    "output",
    "optgroup",
];

static SMALL_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:xx?-)?small\b").unwrap());
static SMALL_FONT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^fontSize(?P<size>\d+)$").unwrap());
static FONT_SHORTHAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^\s*",
        r"(?:(?P<style>normal|italic|oblique)\s+)?",
        r"(?:(?P<variant>normal|small-caps)\s+)?",
        r"(?:(?P<weight>normal|bold|bolder|lighter|[1-9]00)\s+)?",
        r"(?P<size>(?:xx?-)?small|(?:xx?-)?large|medium|larger|smaller|",
        r"[+-]?(?:\d*\.)?\d+(?:px|pt|pc|em|ex|ch|rem|vw|vh|vmin|vmax|cm|mm|in|%))",
        r"(?:\s*/\s*(?P<line>normal|[+-]?(?:\d*\.)?\d+(?:[a-z]+|%)?))?",
        r"(?:\s+(?P<family>.*?))?",
        r"\s*$",
    ))
    .unwrap()
});

/// The parts of a `font` shorthand value. A shorthand without a size is not one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontShorthand {
    pub style: Option<String>,
    pub variant: Option<String>,
    pub weight: Option<String>,
    pub size: String,
    pub line_height: Option<String>,
    pub family: String,
}

impl FontShorthand {
    pub fn parse(value: &str) -> Option<Self> {
        let captures = FONT_SHORTHAND.captures(value)?;
        let part = |name: &str| captures.name(name).map(|m| m.as_str().to_string());
        Some(Self {
            style: part("style"),
            variant: part("variant"),
            weight: part("weight"),
            size: part("size")?,
            line_height: part("line"),
            family: part("family").unwrap_or_default(),
        })
    }
}

/// Source text covered by `range`.
fn source_text(lines: &[String], range: &Range) -> String {
    let mut text = String::new();
    for line in range.start.line..=range.end.line.min(lines.len().saturating_sub(1)) {
        let Some(content) = lines.get(line) else {
            break;
        };
        let start = if line == range.start.line { range.start.column } else { 0 };
        let end = if line == range.end.line {
            range.end.column.min(content.len())
        } else {
            content.len()
        };
        if line != range.start.line {
            text.push('\n');
        }
        if let Some(slice) = content.get(start.min(end)..end) {
            text.push_str(slice);
        }
    }
    text
}

fn informational(element: &HtmlElement, entry: &Entry, description: String) -> Recommendation {
    let action = Action::note(&element.tag, element.range)
        .with_value(source_text(&entry.lines, &element.range))
        .with_description(Some(description))
        .with_file_type(InputKind::HtmlElement);
    Recommendation::new(element.clone(), [Item::new(&element.tag, action)])
}

fn mobile_markup<'a>(entry: &'a Entry, context: &Context) -> Option<&'a Markup> {
    if entry.entity_type != EntityType::Lwc || !context.is_enabled(ContextKey::SldsMobileValidation) {
        return None;
    }
    entry.markup.as_ref()
}

/// Elements whose component is known to misbehave on mobile devices
pub struct MobileFriendlyMatcher {
    registry: ComponentRegistry,
}

impl MobileFriendlyMatcher {
    pub fn new(registry: ComponentRegistry) -> Self {
        Self { registry }
    }
}

impl Matcher for MobileFriendlyMatcher {
    fn name(&self) -> &str {
        "mobile-friendly"
    }

    fn matches(&self, entry: &Entry, _bundle: &Bundle, context: &Context) -> Vec<Recommendation> {
        let Some(markup) = mobile_markup(entry, context) else {
            return Vec::new();
        };
        markup
            .elements()
            .filter(|element| self.registry.is_mobile_unfriendly(&element.tag))
            .map(|element| {
                informational(
                    element,
                    entry,
                    format!(
                        "{} is known to have issues on mobile devices. Consider using a replacement or create a custom component to use instead.",
                        element.tag
                    ),
                )
            })
            .collect()
    }
}

/// Form controls and clickable images without an associated label
pub struct MarkupLabelMatcher;

impl MarkupLabelMatcher {
    fn needs_label(markup: &Markup, element: &HtmlElement, labelled: &HashSet<&str>) -> bool {
        let ancestors = markup.ancestors(element);
        let clickable_image =
            element.tag == "img" && ancestors.iter().any(|ancestor| ancestor.tag == "a");
        if !REQUIRING_LABELS.contains(&element.tag.as_str()) && !clickable_image {
            return false;
        }
        let referenced = element
            .attribute_value("id")
            .is_some_and(|id| labelled.contains(id));
        !referenced && !ancestors.iter().any(|ancestor| ancestor.tag == "label")
    }
}

impl Matcher for MarkupLabelMatcher {
    fn name(&self) -> &str {
        "mobile-label"
    }

    fn matches(&self, entry: &Entry, _bundle: &Bundle, context: &Context) -> Vec<Recommendation> {
        let Some(markup) = mobile_markup(entry, context) else {
            return Vec::new();
        };
        let labelled: HashSet<&str> = markup
            .elements()
            .filter(|element| element.tag == "label")
            .filter_map(|element| element.attribute_value("for"))
            .collect();
        markup
            .elements()
            .filter(|element| Self::needs_label(markup, element, &labelled))
            .map(|element| informational(element, entry, REQUIRE_LABELS.to_string()))
            .collect()
    }
}

/// Small fonts and forced truncation in stylesheets
pub struct MobileCssMatcher {
    catalog: Arc<dyn TokenCatalog>,
}

impl MobileCssMatcher {
    pub fn new(catalog: Arc<dyn TokenCatalog>) -> Self {
        Self { catalog }
    }

    fn item(style: &Style, value: &str, range: Range, description: &str) -> Item {
        let action = Action::note(MOBILE_CSS, range)
            .with_value(value)
            .with_description(Some(description.to_string()))
            .with_related(vec![RelatedInformation {
                path: None,
                range: style.range,
                value: None,
            }])
            .with_file_type(InputKind::Style);
        Item::new(value, action)
    }

    /// Range of the first occurrence of `needle` inside the style value.
    fn range_of(style: &Style, needle: &str) -> Range {
        match style.value.find(needle) {
            Some(start) => style.value_span_range(start, start + needle.len()),
            None => style.value_range,
        }
    }

    fn small_tokens(&self, style: &Style) -> Vec<Item> {
        token::references(&style.value)
            .into_iter()
            .filter(|reference| {
                SMALL_FONT_TOKEN
                    .captures(&reference.name)
                    .and_then(|captures| captures.name("size")?.as_str().parse::<u32>().ok())
                    .is_some_and(|size| (1..4).contains(&size))
            })
            .filter(|reference| {
                self.catalog
                    .design_token(&reference.name)
                    .is_some_and(|token| !token.is_deprecated())
            })
            .map(|reference| {
                let range = style.value_span_range(reference.span.start, reference.span.end);
                Self::item(style, &style.value, range, USE_FONT_SIZE_4_OR_LARGER)
            })
            .collect()
    }

    /// `size` is either the whole value of `font-size` or the size part of `font`.
    fn small_font(style: &Style, size: &str) -> Option<Item> {
        if let Some(keyword) = SMALL_KEYWORD.find(size) {
            let range = Self::range_of(style, keyword.as_str());
            return Some(Self::item(style, size, range, USE_14PX_OR_LARGER));
        }
        let pixels = number::pixels(size)?;
        (pixels < MINIMUM_PIXELS)
            .then(|| Self::item(style, size, Self::range_of(style, size.trim()), USE_14PX_OR_LARGER))
    }

    fn truncates(style: &Style) -> bool {
        let value = style.value.trim();
        match style.property_name().as_str() {
            "white-space" => value == "nowrap",
            "text-overflow" => value == "ellipsis",
            _ => false,
        }
    }

    fn items(&self, style: &Style) -> Vec<Item> {
        let mut items = self.small_tokens(style);
        match style.property_name().as_str() {
            "font-size" => items.extend(Self::small_font(style, &style.value)),
            "font" => {
                if let Some(shorthand) = FontShorthand::parse(&style.value) {
                    items.extend(Self::small_font(style, &shorthand.size));
                }
            }
            _ => {}
        }
        if Self::truncates(style) {
            items.push(Self::item(
                style,
                &style.value,
                Self::range_of(style, style.value.trim()),
                AVOID_TRUNCATION,
            ));
        }
        items
    }
}

impl Matcher for MobileCssMatcher {
    fn name(&self) -> &str {
        "mobile-css"
    }

    fn matches(&self, entry: &Entry, _bundle: &Bundle, context: &Context) -> Vec<Recommendation> {
        if !context.is_enabled(ContextKey::SldsMobileValidation) {
            return Vec::new();
        }
        entry_styles(entry)
            .filter_map(|(_, style)| {
                let items = self.items(style);
                (!items.is_empty()).then(|| Recommendation::new(style.clone(), items))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use slds_parser::Position;

    fn descriptions(found: &[Recommendation]) -> Vec<String> {
        found
            .iter()
            .flat_map(|rec| rec.actions())
            .filter_map(|action| action.description.clone())
            .collect()
    }

    fn run_css(source: &str) -> Vec<Recommendation> {
        let bundle = testing::bundle(&[("card.css", source)]);
        MobileCssMatcher::new(Arc::new(testing::catalog())).matches(
            &bundle.entries()[0],
            &bundle,
            &Context::default(),
        )
    }

    fn run_markup(matcher: &dyn Matcher, source: &str) -> Vec<Recommendation> {
        let bundle = testing::bundle(&[("card.html", source)]);
        matcher.matches(&bundle.entries()[0], &bundle, &Context::default())
    }

    #[test]
    fn test_font_shorthand() {
        let font = FontShorthand::parse("italic small-caps bold 10px/40px Georgia, serif").unwrap();
        assert_eq!(font.style.as_deref(), Some("italic"));
        assert_eq!(font.variant.as_deref(), Some("small-caps"));
        assert_eq!(font.weight.as_deref(), Some("bold"));
        assert_eq!(font.size, "10px");
        assert_eq!(font.line_height.as_deref(), Some("40px"));
        assert_eq!(font.family, "Georgia, serif");

        let bare = FontShorthand::parse("0.8125em").unwrap();
        assert_eq!(bare.size, "0.8125em");
        assert_eq!(bare.weight, None);
        assert_eq!(bare.family, "");

        assert_eq!(FontShorthand::parse("777"), None);
        assert_eq!(FontShorthand::parse(""), None);
        assert_eq!(FontShorthand::parse("italic small-caps bold Georgia, serif"), None);
    }

    #[test]
    fn test_small_font_sizes() {
        let found = run_css(".a { font-size: 12px; }\n.b { font-size: 1rem; }\n.c { font-size: x-small; }");
        assert_eq!(found.len(), 2);
        assert_eq!(descriptions(&found), vec![USE_14PX_OR_LARGER, USE_14PX_OR_LARGER]);
        let action = found[0].actions().next().unwrap();
        assert_eq!(action.name, MOBILE_CSS);
        assert_eq!(action.range, Range::on_line(0, 16, 20));
        assert_eq!(action.related_information[0].range, found[0].input.range());
    }

    #[test]
    fn test_font_shorthand_size() {
        let found = run_css(".a { font: bold 0.75rem/1.5 Arial; }");
        assert_eq!(found.len(), 1);
        let item = found[0].items.iter().next().unwrap();
        assert_eq!(item.value, "0.75rem");
        assert!(run_css(".a { font: bold 16px Arial; }").is_empty());
    }

    #[test]
    fn test_small_font_tokens() {
        let found = run_css(".a { font-size: var(--lwc-fontSize2, 0.75rem); }");
        let found = descriptions(&found);
        assert!(found.contains(&USE_FONT_SIZE_4_OR_LARGER.to_string()));
        assert!(run_css(".a { font-size: var(--lwc-fontSize5); }").is_empty());
    }

    #[test]
    fn test_truncation() {
        let found = run_css(".a { white-space: nowrap; text-overflow: ellipsis; overflow: hidden; }");
        assert_eq!(descriptions(&found), vec![AVOID_TRUNCATION, AVOID_TRUNCATION]);
    }

    #[test]
    fn test_mobile_unfriendly_components() {
        let source = "<template>\n    <lightning-datatable key-field=\"id\"></lightning-datatable>\n    <lightning-button></lightning-button>\n</template>";
        let found = run_markup(&MobileFriendlyMatcher::new(testing::registry()), source);
        assert_eq!(found.len(), 1);
        let action = found[0].actions().next().unwrap();
        assert_eq!(action.name, "lightning-datatable");
        assert_eq!(action.range.start, Position::new(1, 4));
        assert_eq!(
            action.value.as_deref(),
            Some("<lightning-datatable key-field=\"id\"></lightning-datatable>")
        );
        assert!(action
            .description
            .as_deref()
            .unwrap()
            .starts_with("lightning-datatable is known to have issues"));
    }

    #[test]
    fn test_aura_markup_is_skipped() {
        let source = "<aura:component><lightning:datatable/></aura:component>";
        assert!(run_markup(&MobileFriendlyMatcher::new(testing::registry()), source).is_empty());
        assert!(run_markup(&MarkupLabelMatcher, "<aura:component><input/></aura:component>").is_empty());
    }

    #[test]
    fn test_labels() {
        let source = concat!(
            "<template>\n",
            "  <label for=\"name\">Name</label><input id=\"name\">\n",
            "  <label>Age <input></label>\n",
            "  <input id=\"orphan\">\n",
            "  <a href=\"#\"><img src=\"x.png\"></a>\n",
            "  <img src=\"y.png\">\n",
            "  <lightning-button-icon icon-name=\"utility:close\"></lightning-button-icon>\n",
            "</template>"
        );
        let found = run_markup(&MarkupLabelMatcher, source);
        let tags: Vec<_> = found
            .iter()
            .map(|rec| rec.items.iter().next().unwrap().value.clone())
            .collect();
        assert_eq!(tags, vec!["input", "img", "lightning-button-icon"]);
        assert!(descriptions(&found).iter().all(|d| d == REQUIRE_LABELS));
    }

    #[test]
    fn test_disabled() {
        let bundle = testing::bundle(&[("card.css", ".a { white-space: nowrap; }")]);
        let context = Context::with_disabled(["SLDS_MOBILE_VALIDATION"]);
        let matcher = MobileCssMatcher::new(Arc::new(testing::catalog()));
        assert!(matcher.matches(&bundle.entries()[0], &bundle, &context).is_empty());
    }
}
