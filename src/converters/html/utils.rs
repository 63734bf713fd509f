//! Utility functions for template conversion: escaping, SVG number parsing and
//! transform parsing.

use crate::models::elements::Offset;
use regex::Regex;
use std::sync::OnceLock;

// --- Text Escaping ---

/// Escapes special characters (`&`, `<`, `>`) for use in HTML text content.
pub fn escape_html_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes a value for use inside a double-quoted HTML attribute.
pub fn escape_html_attr(value: &str) -> String {
    escape_html_text(value).replace('"', "&quot;")
}

// --- Number Parsing ---

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("regex must compile")
    })
}

fn translate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"translate\(\s*([^\s,)]+)(?:[\s,]+([^\s,)]+))?\s*\)")
            .expect("regex must compile")
    })
}

/// Parses an SVG length that must be a plain number, optionally suffixed with `px`.
/// Returns `None` for other units, percentages and garbage, mirroring a strict
/// numeric coercion.
pub fn parse_length(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim_end();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parses the first value of a coordinate attribute. SVG allows lists such as
/// `x="10 20 30"` on `<text>`; only the first entry positions the element.
pub fn parse_coordinate(value: &str) -> Option<f64> {
    let first = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .find(|token| !token.is_empty())?;
    parse_length(first)
}

/// Parses a font size such as `12`, `12px` or `12pt`, ignoring the unit.
pub fn parse_font_size(value: &str) -> Option<f64> {
    number_regex()
        .find(value.trim())
        .filter(|m| m.start() == 0)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| *n > 0.0)
}

/// Returns every numeric token in a path `d` attribute, in order.
pub fn numeric_tokens(data: &str) -> Vec<f64> {
    number_regex()
        .find_iter(data)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

// --- Transformation ---

/// Extracts the translation part of an SVG `transform` attribute.
///
/// Every `translate(tx[, ty])` is summed; `scale`, `rotate`, `skew` and `matrix`
/// are ignored. This is a shallow approximation, not matrix composition.
pub fn parse_translate(transform: &str) -> Offset {
    let mut offset = Offset::default();
    for caps in translate_regex().captures_iter(transform) {
        let dx = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0);
        let dy = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0);
        offset.dx += dx;
        offset.dy += dy;
    }
    offset
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("612"), Some(612.0));
        assert_eq!(parse_length(" 100px "), Some(100.0));
        assert_eq!(parse_length("100%"), None);
        assert_eq!(parse_length("8.5in"), None);
        assert_eq!(parse_length("abc"), None);
    }

    #[test]
    fn test_parse_coordinate_takes_first_of_list() {
        assert_eq!(parse_coordinate("10 20 30"), Some(10.0));
        assert_eq!(parse_coordinate("5,6"), Some(5.0));
        assert_eq!(parse_coordinate(""), None);
    }

    #[test]
    fn test_parse_font_size_ignores_unit() {
        assert_eq!(parse_font_size("24px"), Some(24.0));
        assert_eq!(parse_font_size("10.5pt"), Some(10.5));
        assert_eq!(parse_font_size("large"), None);
        assert_eq!(parse_font_size("0"), None);
    }

    #[test]
    fn test_numeric_tokens_split_compact_path_data() {
        assert_eq!(
            numeric_tokens("M10,20L-5.5.5z"),
            vec![10.0, 20.0, -5.5, 0.5]
        );
    }

    #[test]
    fn test_parse_translate() {
        assert_eq!(
            parse_translate("translate(10, 20)"),
            Offset { dx: 10.0, dy: 20.0 }
        );
        assert_eq!(parse_translate("translate(7)"), Offset { dx: 7.0, dy: 0.0 });
        assert_eq!(
            parse_translate("translate(1 2) scale(3) translate(4 5)"),
            Offset { dx: 5.0, dy: 7.0 }
        );
        assert!(parse_translate("rotate(45)").is_zero());
    }

    #[test]
    fn test_escape_html_attr() {
        assert_eq!(escape_html_attr(r#"a"b<c>&"#), "a&quot;b&lt;c&gt;&amp;");
    }
}
