//! Fixed patterns shared by the recognizers and the token matchers.

use once_cell::sync::Lazy;
use regex::Regex;

const NUMBER: &str = r"(?:\d+(?:\.\d*)?|\.\d+)";

const COLOR: &str = concat!(
    r"#\w{6,8}",
    r"|rgb\(\s*\d+,\s*\d+,\s*\d+\s*\)",
    r"|rgba\(\s*\d+,\s*\d+,\s*\d+,\s*(?:\d+(?:\.\d*)?|\.\d+)\s*\)",
    r"|hsl\(\s*\d+,\s*(?:\d+(?:\.\d*)?|\.\d+)%,\s*(?:\d+(?:\.\d*)?|\.\d+)%\s*\)",
);

fn signed_number() -> String {
    format!(r"(?P<sign>[-+])?(?P<number>{NUMBER})")
}

fn numeric() -> String {
    format!(r"[-+]?{NUMBER}\s*[a-zA-Z]+|[-+]?{NUMBER}%|[-+]?{NUMBER}")
}

pub(crate) static UNIT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"{}\s*(?P<unit>[a-zA-Z]+)", signed_number())).unwrap());

pub(crate) static PERCENT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("{}%", signed_number())).unwrap());

pub(crate) static UNITLESS_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(&signed_number()).unwrap());

pub(crate) static HEX_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w{6,8}").unwrap());

pub(crate) static RGB_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"rgb\(\s*(?P<red>\d+),\s*(?P<green>\d+),\s*(?P<blue>\d+)\s*\)").unwrap()
});

pub(crate) static RGBA_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"rgba\(\s*(?P<red>\d+),\s*(?P<green>\d+),\s*(?P<blue>\d+),\s*(?P<alpha>{NUMBER})\s*\)"
    ))
    .unwrap()
});

pub(crate) static HSL_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"hsl\(\s*(?P<hue>\d+),\s*(?P<saturation>{NUMBER})%,\s*(?P<lightness>{NUMBER})%\s*\)"
    ))
    .unwrap()
});

pub(crate) static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// `t(name)` or `token(name)`, not preceded by a word character (`format(woff)` is no token).
pub(crate) static AURA_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bt(?:oken)?\((?P<token>\w+)\)").unwrap());

/// `var(--lwc-name)` with an optional literal fallback.
pub(crate) static VAR_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"var\(\s*--lwc-(?P<token>[\w-]+)\s*(?:,\s*(?P<fallback>{COLOR}|{}|\w+)\s*)?\)",
        numeric()
    ))
    .unwrap()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_fallback_forms() {
        for (source, fallback) in [
            ("var(--lwc-colorText)", None),
            ("var(--lwc-colorText, #c81e1e)", Some("#c81e1e")),
            ("var(--lwc-spacingSmall, 0.75rem)", Some("0.75rem")),
            ("var(--lwc-spacingSmall,-2px)", Some("-2px")),
            ("var( --lwc-colorText , rgb(0, 0, 0) )", Some("rgb(0, 0, 0)")),
            ("var(--lwc-lineHeight, normal)", Some("normal")),
        ] {
            let captures = VAR_TOKEN.captures(source).unwrap();
            assert_eq!(
                captures.name("fallback").map(|m| m.as_str()),
                fallback,
                "{source}"
            );
        }
    }

    #[test]
    fn test_aura_token_needs_word_boundary() {
        assert!(AURA_TOKEN.is_match("t(spacingSmall)"));
        assert!(AURA_TOKEN.is_match("token(spacingSmall)"));
        assert!(AURA_TOKEN.is_match("0 T(spacingSmall)"));
        assert!(!AURA_TOKEN.is_match("format(woff)"));
    }
}
