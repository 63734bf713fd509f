//! Detects template placeholders such as `{{title}}` in text content.

use crate::models::elements::{walk_text, DrawingElement};
use indexmap::IndexSet;
use regex::Regex;
use std::sync::OnceLock;

/// The bracket syntaxes a placeholder may be written in, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderSyntax {
    /// `{{name}}`
    DoubleBrace,
    /// `${name}`
    DollarBrace,
    /// `%name%`
    Percent,
    /// `[name]`
    Bracket,
}

impl PlaceholderSyntax {
    /// All syntaxes, highest priority first.
    pub const ALL: [PlaceholderSyntax; 4] = [
        PlaceholderSyntax::DoubleBrace,
        PlaceholderSyntax::DollarBrace,
        PlaceholderSyntax::Percent,
        PlaceholderSyntax::Bracket,
    ];

    /// Syntaxes that are unambiguous enough to scan raw markup with.
    pub const MARKUP_SAFE: [PlaceholderSyntax; 2] =
        [PlaceholderSyntax::DoubleBrace, PlaceholderSyntax::DollarBrace];

    fn regex(&self) -> &'static Regex {
        static DOUBLE_BRACE: OnceLock<Regex> = OnceLock::new();
        static DOLLAR_BRACE: OnceLock<Regex> = OnceLock::new();
        static PERCENT: OnceLock<Regex> = OnceLock::new();
        static BRACKET: OnceLock<Regex> = OnceLock::new();

        let (cell, pattern) = match self {
            PlaceholderSyntax::DoubleBrace => (
                &DOUBLE_BRACE,
                r"\{\{\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}\}",
            ),
            PlaceholderSyntax::DollarBrace => (
                &DOLLAR_BRACE,
                r"\$\{\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}",
            ),
            PlaceholderSyntax::Percent => (&PERCENT, r"%([A-Za-z_][A-Za-z0-9_.\-]*)%"),
            PlaceholderSyntax::Bracket => (&BRACKET, r"\[([A-Za-z_][A-Za-z0-9_.\-]*)\]"),
        };
        cell.get_or_init(|| Regex::new(pattern).expect("regex must compile"))
    }

    /// Returns every placeholder name written in this syntax, in order of appearance.
    pub fn find_all(&self, text: &str) -> Vec<String> {
        self.regex()
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Finds the placeholders of one text node.
///
/// The first syntax (in priority order) with any match wins; matches of the
/// lower-priority syntaxes in the same text are ignored. Names are
/// deduplicated within the node.
pub fn detect_placeholders(text: &str) -> Vec<String> {
    for syntax in PlaceholderSyntax::ALL {
        let names = syntax.find_all(text);
        if !names.is_empty() {
            let unique: IndexSet<String> = names.into_iter().collect();
            return unique.into_iter().collect();
        }
    }
    Vec::new()
}

/// The placeholder an element is tagged with: the first match of the winning syntax.
pub fn primary_placeholder(text: &str) -> Option<String> {
    detect_placeholders(text).into_iter().next()
}

/// Builds the document-wide placeholder list.
///
/// Collects the placeholders of every text element (descending into groups)
/// and, when `raw_markup` is given, any `{{name}}`/`${name}` written elsewhere
/// in the document such as in attribute values. The result is deduplicated and
/// keeps first-seen order.
pub fn collect_placeholders(elements: &[DrawingElement], raw_markup: Option<&str>) -> Vec<String> {
    let mut names: IndexSet<String> = IndexSet::new();
    walk_text(elements, &mut |text| {
        names.extend(detect_placeholders(&text.content));
    });
    if let Some(markup) = raw_markup {
        for syntax in PlaceholderSyntax::MARKUP_SAFE {
            names.extend(syntax.find_all(markup));
        }
    }
    names.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_syntax_is_recognized() {
        assert_eq!(detect_placeholders("{{title}}"), vec!["title"]);
        assert_eq!(detect_placeholders("{{ title }}"), vec!["title"]);
        assert_eq!(detect_placeholders("Hello ${first_name}"), vec!["first_name"]);
        assert_eq!(detect_placeholders("%company%"), vec!["company"]);
        assert_eq!(detect_placeholders("Dear [recipient.name],"), vec!["recipient.name"]);
    }

    #[test]
    fn test_first_matching_syntax_wins() {
        // Both `{{a}}` and `[b]` are present; only the higher-priority syntax counts.
        assert_eq!(detect_placeholders("[b] and {{a}}"), vec!["a"]);
        assert_eq!(primary_placeholder("%x% ${y}"), Some("y".to_string()));
    }

    #[test]
    fn test_duplicates_within_a_node_are_removed() {
        assert_eq!(detect_placeholders("{{a}} {{b}} {{a}}"), vec!["a", "b"]);
    }

    #[test]
    fn test_plain_text_and_percentages_are_not_placeholders() {
        assert!(detect_placeholders("Save 50% today").is_empty());
        assert!(detect_placeholders("50% to 75%").is_empty());
        assert!(detect_placeholders("[1]").is_empty());
        assert_eq!(primary_placeholder("Quarterly report"), None);
    }

    #[test]
    fn test_markup_scan_only_uses_unambiguous_syntaxes() {
        let markup = r#"<image href="{{logo}}"/><text>[ignored]</text>"#;
        assert_eq!(collect_placeholders(&[], Some(markup)), vec!["logo"]);
    }
}
