//! Color recognition: hex, `hsl()`, `rgba()`, `rgb()` and named colors.
//!
//! Every opaque color registers its lower and upper case hex, `rgb()` and
//! `hsl()` forms. `rgba()` only normalizes its own spelling.

use super::named_colors::NAMED_COLORS;
use super::number::{format_decimal, Rounding};
use super::pattern::{HEX_COLOR, HSL_COLOR, RGBA_COLOR, RGB_COLOR, WORD};
use super::{Recognizer, Span, StateBuilder};
use regex::Captures;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parses `#rrggbb`, ignoring a trailing alpha pair.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !matches!(digits.len(), 6 | 8) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `hue` in degrees, `saturation` and `lightness` in percent.
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Option<Self> {
        if !(0.0..=100.0).contains(&saturation) || !(0.0..=100.0).contains(&lightness) {
            return None;
        }
        let h = (hue % 360.0) / 360.0;
        let s = saturation / 100.0;
        let l = lightness / 100.0;

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let channel = |t: f64| (hue_to_rgb(p, q, t) * 255.0).round().clamp(0.0, 255.0) as u8;

        Some(Self::new(
            channel(h + 1.0 / 3.0),
            channel(h),
            channel(h - 1.0 / 3.0),
        ))
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    pub fn rgb(&self) -> String {
        format!("rgb({}, {}, {})", self.red, self.green, self.blue)
    }

    pub fn hsl(&self) -> String {
        let (h, s, l) = self.to_hsl();
        format!(
            "hsl({}, {}%, {}%)",
            h.round() as i64,
            format_decimal(s, 2, Rounding::HalfDown),
            format_decimal(l, 2, Rounding::HalfDown)
        )
    }

    fn to_hsl(self) -> (f64, f64, f64) {
        let r = f64::from(self.red) / 255.0;
        let g = f64::from(self.green) / 255.0;
        let b = f64::from(self.blue) / 255.0;
        let min = r.min(g).min(b);
        let max = r.max(g).max(b);

        let h = if max == min {
            0.0
        } else if max == r {
            ((60.0 * (g - b) / (max - min)) + 360.0) % 360.0
        } else if max == g {
            (60.0 * (b - r) / (max - min)) + 120.0
        } else {
            (60.0 * (r - g) / (max - min)) + 240.0
        };

        let l = (max + min) / 2.0;
        let s = if max == min {
            0.0
        } else if l <= 0.5 {
            (max - min) / (max + min)
        } else {
            (max - min) / (2.0 - max - min)
        };

        (h, s * 100.0, l * 100.0)
    }
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };
    if 6.0 * t < 1.0 {
        p + (q - p) * 6.0 * t
    } else if 2.0 * t < 1.0 {
        q
    } else if 3.0 * t < 2.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Looks up a CSS color keyword, case-insensitively.
pub fn named(name: &str) -> Option<Rgb> {
    let lower = name.to_ascii_lowercase();
    NAMED_COLORS
        .binary_search_by(|(candidate, _)| candidate.cmp(&lower.as_str()))
        .ok()
        .and_then(|index| Rgb::from_hex(NAMED_COLORS[index].1))
}

pub struct ColorRecognizer;

impl ColorRecognizer {
    fn add(state: &mut StateBuilder, span: Span, color: Rgb) {
        let hex = color.hex();
        state.add(span, hex.to_uppercase());
        state.add(span, hex);
        state.add(span, color.rgb());
        state.add(span, color.hsl());
    }

    fn channels(captures: &Captures<'_>) -> Option<Rgb> {
        let channel = |name: &str| captures.name(name)?.as_str().parse::<u8>().ok();
        Some(Rgb::new(channel("red")?, channel("green")?, channel("blue")?))
    }
}

impl Recognizer for ColorRecognizer {
    fn recognize(&self, input: &str, state: &mut StateBuilder) {
        for found in HEX_COLOR.find_iter(input) {
            if let Some(color) = Rgb::from_hex(found.as_str()) {
                Self::add(state, found.into(), color);
            }
        }

        for captures in HSL_COLOR.captures_iter(input) {
            let number = |name: &str| {
                captures
                    .name(name)
                    .and_then(|m| m.as_str().parse::<f64>().ok())
            };
            let (Some(hue), Some(saturation), Some(lightness)) =
                (number("hue"), number("saturation"), number("lightness"))
            else {
                continue;
            };
            if let (Some(color), Some(whole)) = (
                Rgb::from_hsl(hue, saturation, lightness),
                captures.get(0),
            ) {
                Self::add(state, whole.into(), color);
            }
        }

        for captures in RGBA_COLOR.captures_iter(input) {
            let Some(color) = Self::channels(&captures) else {
                continue;
            };
            let Some(alpha) = captures
                .name("alpha")
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .filter(|alpha| (0.0..=1.0).contains(alpha))
            else {
                continue;
            };
            if let Some(whole) = captures.get(0) {
                state.add(
                    whole.into(),
                    format!(
                        "rgba({}, {}, {}, {})",
                        color.red,
                        color.green,
                        color.blue,
                        format_decimal(alpha, 2, Rounding::HalfDown)
                    ),
                );
            }
        }

        for captures in RGB_COLOR.captures_iter(input) {
            if let (Some(color), Some(whole)) = (Self::channels(&captures), captures.get(0)) {
                Self::add(state, whole.into(), color);
            }
        }

        for found in WORD.find_iter(input) {
            if let Some(color) = named(found.as_str()) {
                Self::add(state, found.into(), color);
            }
        }
    }
}
