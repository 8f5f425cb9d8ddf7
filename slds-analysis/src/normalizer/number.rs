//! Numeric recognition: values with a length unit, percentages and bare numbers.
//!
//! Lengths in the px family are related through 16px = 1rem = 1em = 100% and
//! 96px = 1in = 72pt. Converted magnitudes keep at most three fraction
//! digits, rounded half to even.

use super::pattern::{PERCENT_NUMBER, UNITLESS_NUMBER, UNIT_NUMBER};
use super::{Recognizer, Span, StateBuilder};
use regex::Captures;

pub const UNITS: &[&str] = &[
    "cm", "mm", "in", "px", "pt", "pc", "em", "ex", "ch", "rem", "vw", "vh", "vmin", "vmax",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    HalfEven,
    HalfDown,
}

/// Formats `value` with at most `max_fraction` digits and no trailing zeros.
pub fn format_decimal(value: f64, max_fraction: usize, rounding: Rounding) -> String {
    let text = match rounding {
        Rounding::HalfEven => format!("{:.*}", max_fraction, value),
        Rounding::HalfDown => {
            let scale = 10f64.powi(max_fraction as i32);
            let scaled = value.abs() * scale;
            let floor = scaled.floor();
            let rounded = if scaled - floor > 0.5 { floor + 1.0 } else { floor };
            format!("{:.*}", max_fraction, rounded.copysign(value) / scale)
        }
    };
    let trimmed = trim_fraction(&text);
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed
    }
}

fn trim_fraction(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text.to_string()
    }
}

/// Drops trailing fraction zeros and gives a leading `.` its `0`.
pub fn cleanse(number: &str) -> String {
    let mut text = trim_fraction(number);
    if text.is_empty() {
        return "0".to_string();
    }
    if text.starts_with('.') {
        text.insert(0, '0');
    }
    text
}

/// Pixels per unit for the convertible units.
fn pixels_per(unit: &str) -> Option<f64> {
    match unit {
        "px" => Some(1.0),
        "rem" | "em" => Some(16.0),
        "pt" => Some(96.0 / 72.0),
        "in" => Some(96.0),
        "%" => Some(0.16),
        _ => None,
    }
}

/// Units a value written in `unit` is also emitted in.
fn conversions(unit: &str) -> &'static [&'static str] {
    match unit {
        "px" => &["rem", "em", "%", "pt"],
        "rem" | "em" => &["px", "pt", "%"],
        "pt" => &["px", "rem", "em", "%"],
        "in" => &["px", "pt", "rem", "em", "%"],
        _ => &[],
    }
}

#[derive(Debug, Clone)]
struct Quantity<'a> {
    sign: &'a str,
    magnitude: f64,
    number: String,
}

impl<'a> Quantity<'a> {
    fn from_captures(captures: &Captures<'a>) -> Option<Self> {
        let raw = captures.name("number")?.as_str();
        let magnitude = raw.parse::<f64>().ok()?;
        Some(Self {
            sign: captures.name("sign").map_or("", |m| m.as_str()),
            magnitude,
            number: cleanse(raw),
        })
    }

    fn render(&self, unit: &str) -> String {
        generate(self.sign, &self.number, unit)
    }

    /// A written percentage keeps its `%`, zero included.
    fn render_percent(&self) -> String {
        if self.magnitude == 0.0 {
            "0%".to_string()
        } else {
            self.render("%")
        }
    }

    fn convert(&self, from: &str, to: &str) -> Option<String> {
        let pixels = self.magnitude * pixels_per(from)?;
        let converted = pixels / pixels_per(to)?;
        let number = format_decimal(converted, 3, Rounding::HalfEven);
        Some(generate(self.sign, &number, to))
    }
}

/// Zero drops its sign and its unit.
fn generate(sign: &str, number: &str, unit: &str) -> String {
    if number.parse::<f64>().is_ok_and(|value| value == 0.0) {
        return "0".to_string();
    }
    format!("{sign}{number}{unit}")
}

/// Converts a single length such as `0.75rem` or `12px` into pixels.
pub fn pixels(value: &str) -> Option<f64> {
    let value = value.trim();
    let captures = UNIT_NUMBER.captures(value)?;
    if captures.get(0)?.as_str().len() != value.len() {
        return None;
    }
    let unit = captures.name("unit")?.as_str().to_ascii_lowercase();
    let quantity = Quantity::from_captures(&captures)?;
    let magnitude = quantity.magnitude * pixels_per(&unit)?;
    Some(if quantity.sign == "-" { -magnitude } else { magnitude })
}

pub struct NumberRecognizer;

impl Recognizer for NumberRecognizer {
    fn recognize(&self, input: &str, state: &mut StateBuilder) {
        let mut measured = Vec::new();
        for captures in UNIT_NUMBER.captures_iter(input) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let unit = captures
                .name("unit")
                .map(|m| m.as_str().to_ascii_lowercase())
                .unwrap_or_default();
            if !UNITS.contains(&unit.as_str()) {
                continue;
            }
            let Some(quantity) = Quantity::from_captures(&captures) else {
                continue;
            };
            let span = Span::from(whole);
            measured.push(span);
            state.add(span, quantity.render(&unit));
            for target in conversions(&unit) {
                if let Some(converted) = quantity.convert(&unit, target) {
                    state.add(span, converted);
                }
            }
        }

        for captures in PERCENT_NUMBER.captures_iter(input) {
            if let (Some(whole), Some(quantity)) =
                (captures.get(0), Quantity::from_captures(&captures))
            {
                state.add(whole.into(), quantity.render_percent());
            }
        }

        for captures in UNITLESS_NUMBER.captures_iter(input) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let right_bounded = whole.end() == input.len() || input[whole.end()..].starts_with(' ');
            let left_bounded = whole.start() == 0
                || captures.name("sign").is_some()
                || input[..whole.start()].ends_with(' ');
            // `.5 rem` is one measurement, not a number followed by a word
            let has_unit = measured.iter().any(|span| span.start == whole.start());
            if !(left_bounded && right_bounded) || has_unit {
                continue;
            }
            if let Some(quantity) = Quantity::from_captures(&captures) {
                state.add(whole.into(), quantity.render(""));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::Normalizer;
    use rstest::rstest;
    use std::collections::BTreeSet;

    fn spans(input: &str) -> Vec<(String, BTreeSet<String>)> {
        let state = Normalizer::new(vec![Box::new(NumberRecognizer)]).normalize(input);
        state
            .values()
            .iter()
            .map(|(span, values)| (state.text(span).to_string(), values.clone()))
            .collect()
    }

    #[rstest]
    #[case("13.00000", "13")]
    #[case(".850", "0.85")]
    #[case("123.2200", "123.22")]
    #[case("0.0", "0")]
    #[case("10", "10")]
    fn test_cleanse(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(cleanse(raw), expected);
    }

    #[rstest]
    #[case(0.8125, 3, Rounding::HalfEven, "0.812")]
    #[case(0.0625, 3, Rounding::HalfEven, "0.062")]
    #[case(45.098, 2, Rounding::HalfDown, "45.1")]
    #[case(73.913, 2, Rounding::HalfDown, "73.91")]
    #[case(100.0, 2, Rounding::HalfDown, "100")]
    #[case(-0.0001, 2, Rounding::HalfDown, "0")]
    fn test_format_decimal(
        #[case] value: f64,
        #[case] digits: usize,
        #[case] rounding: Rounding,
        #[case] expected: &str,
    ) {
        assert_eq!(format_decimal(value, digits, rounding), expected);
    }

    #[test]
    fn test_spaced_unit() {
        let found = spans(".82500 rem");
        assert_eq!(found.len(), 1);
        assert!(found[0].1.contains("0.825rem"));
        assert!(found[0].1.contains("13.2px"));
    }

    #[test]
    fn test_px_to_rem_rounds_half_even() {
        let found = spans("13.00000 px");
        assert!(found[0].1.contains("13px"));
        assert!(found[0].1.contains("0.812rem"));
    }

    #[test]
    fn test_percent_keeps_its_own_form() {
        let found = spans("0.123%");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, BTreeSet::from(["0.123%".to_string()]));
        assert_eq!(spans("0%")[0].1, BTreeSet::from(["0%".to_string()]));
    }

    #[test]
    fn test_unitless_needs_boundaries() {
        let found = spans("12 16px");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, "12");
        assert_eq!(found[0].1, BTreeSet::from(["12".to_string()]));
        assert_eq!(found[1].0, "16px");

        assert!(spans("h1").is_empty());
        assert!(spans("calc(2*3)").is_empty());
    }

    #[rstest]
    #[case("0px")]
    #[case("0rem")]
    #[case("-0em")]
    #[case("0in")]
    #[case("0.0pt")]
    fn test_zero_has_no_unit(#[case] length: &str) {
        let found = spans(length);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, BTreeSet::from(["0".to_string()]));
    }

    #[test]
    fn test_unknown_unit_is_ignored() {
        assert!(spans("10deg").is_empty());
        assert!(spans("2fr").is_empty());
    }

    #[test]
    fn test_pixels() {
        assert_eq!(pixels("12px"), Some(12.0));
        assert_eq!(pixels("0.75rem"), Some(12.0));
        assert_eq!(pixels("-1em"), Some(-16.0));
        assert_eq!(pixels("small"), None);
        assert_eq!(pixels("2vw"), None);
        assert_eq!(pixels("12px 14px"), None);
    }
}
