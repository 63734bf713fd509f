//! Best-effort repair of SVG markup the XML parser rejects.
//!
//! Hand-edited and exported templates often carry HTML habits into XML:
//! named entities such as `&nbsp;`, a bare `&` in text, or `xlink:`
//! attributes without a namespace declaration. `repair_markup` rewrites
//! these so the document parses. When a document is beyond repair,
//! `standalone_fragments` cuts out the well-formed drawing tags so they can
//! be parsed one at a time.

use super::constants::XLINK_NS;
use indexmap::IndexSet;
use log::debug;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

/// The entities XML defines itself.
const XML_ENTITIES: &[&str] = &["amp", "lt", "gt", "quot", "apos"];

/// Common HTML named entities and their code points.
const HTML_ENTITIES: &[(&str, u32)] = &[
    ("nbsp", 160),
    ("iexcl", 161),
    ("cent", 162),
    ("pound", 163),
    ("yen", 165),
    ("sect", 167),
    ("copy", 169),
    ("laquo", 171),
    ("reg", 174),
    ("deg", 176),
    ("plusmn", 177),
    ("para", 182),
    ("middot", 183),
    ("raquo", 187),
    ("frac12", 189),
    ("times", 215),
    ("divide", 247),
    ("ndash", 8211),
    ("mdash", 8212),
    ("lsquo", 8216),
    ("rsquo", 8217),
    ("ldquo", 8220),
    ("rdquo", 8221),
    ("bull", 8226),
    ("hellip", 8230),
    ("euro", 8364),
    ("trade", 8482),
];

// --- Patterns ---

/// An `&` and, when it starts one, the rest of a reference including `;`.
fn ampersand_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#[0-9]+;|#[xX][0-9A-Fa-f]+;|[A-Za-z_][A-Za-z0-9._-]*;)?")
            .expect("regex must compile")
    })
}

fn entity_declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<!ENTITY\s+([A-Za-z_][A-Za-z0-9._-]*)").expect("regex must compile")
    })
}

fn namespace_declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"xmlns:([A-Za-z_][A-Za-z0-9._-]*)\s*=").expect("regex must compile")
    })
}

/// `<prefix:name` or `</prefix:name`.
fn element_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"</?([A-Za-z_][A-Za-z0-9._-]*):[A-Za-z_]").expect("regex must compile")
    })
}

/// ` prefix:name="`, an attribute with a namespace prefix.
fn attribute_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\s([A-Za-z_][A-Za-z0-9._-]*):[A-Za-z_][A-Za-z0-9._-]*\s*=\s*["']"#)
            .expect("regex must compile")
    })
}

fn root_svg_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<svg[\s/>]").expect("regex must compile"))
}

fn text_fragment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<text(?:\s[^>]*)?>.*?</text\s*>").expect("regex must compile")
    })
}

/// A complete `<text>…</text>`, or the start tag of an image, circle or path.
fn fragment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<text(?:\s[^>]*)?>.*?</text\s*>|<(?:image|circle|path)\s[^>]*>")
            .expect("regex must compile")
    })
}

// --- Repair ---

/// Rewrites every `&` that XML would reject. HTML named entities become
/// numeric references, unknown names and bare ampersands are escaped.
/// Entities declared in an internal DTD subset are left alone.
fn escape_entities(markup: &str) -> Cow<'_, str> {
    let declared: IndexSet<&str> = entity_declaration_regex()
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();

    ampersand_regex().replace_all(markup, |caps: &Captures<'_>| {
        let Some(reference) = caps.get(1).map(|m| m.as_str()) else {
            return "&amp;".to_string();
        };
        if reference.starts_with('#') {
            return format!("&{}", reference);
        }
        let name = reference.trim_end_matches(';');
        if XML_ENTITIES.contains(&name) || declared.contains(name) {
            return format!("&{}", reference);
        }
        match HTML_ENTITIES.iter().find(|(entity, _)| *entity == name) {
            Some((_, code)) => format!("&#{};", code),
            None => format!("&amp;{}", reference),
        }
    })
}

/// Declares every namespace prefix that is used but never bound, on the
/// first `<svg` tag. `xlink` gets its real namespace; any other prefix
/// (editor metadata such as `inkscape:`) gets a stand-in URN.
///
/// Returns `None` when nothing is missing or there is no `<svg` tag.
fn declare_missing_prefixes(markup: &str) -> Option<String> {
    let declared: IndexSet<&str> = namespace_declaration_regex()
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();

    let missing: IndexSet<&str> = element_prefix_regex()
        .captures_iter(markup)
        .chain(attribute_prefix_regex().captures_iter(markup))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|prefix| !matches!(*prefix, "xml" | "xmlns") && !declared.contains(prefix))
        .collect();
    if missing.is_empty() {
        return None;
    }

    let insert_at = root_svg_regex().find(markup)?.start() + "<svg".len();
    let declarations: String = missing
        .iter()
        .map(|prefix| {
            if *prefix == "xlink" {
                format!(r#" xmlns:xlink="{}""#, XLINK_NS)
            } else {
                format!(r#" xmlns:{0}="urn:x-undeclared:{0}""#, prefix)
            }
        })
        .collect();
    debug!("Declaring missing namespace prefixes: {:?}", missing);

    let mut out = String::with_capacity(markup.len() + declarations.len());
    out.push_str(&markup[..insert_at]);
    out.push_str(&declarations);
    out.push_str(&markup[insert_at..]);
    Some(out)
}

/// Repairs markup the XML parser rejected.
///
/// Returns `None` when no repair applies, so the caller knows a second parse
/// would fail the same way.
pub(super) fn repair_markup(markup: &str) -> Option<String> {
    let escaped = escape_entities(markup);
    let repaired = declare_missing_prefixes(&escaped).unwrap_or_else(|| escaped.into_owned());
    (repaired != markup).then_some(repaired)
}

/// Cuts the well-formed `<text>…</text>` elements and the image, circle and
/// path start tags out of markup, in source order. Each one is wrapped in its
/// own `<svg>` root with the prefixes it uses declared, ready to be parsed alone.
///
/// Context is lost: nothing is inherited from ancestors and group transforms
/// are not applied.
pub(super) fn standalone_fragments(markup: &str) -> Vec<String> {
    fragment_regex()
        .find_iter(markup)
        .map(|m| {
            let tag = m.as_str();
            let element = if tag.starts_with("<text") || tag.ends_with("/>") {
                Cow::Borrowed(tag)
            } else {
                // An opening tag whose children and end tag are dropped.
                Cow::Owned(format!("{}/>", &tag[..tag.len() - 1]))
            };
            let wrapped = format!("<svg>{}</svg>", element);
            declare_missing_prefixes(&wrapped).unwrap_or(wrapped)
        })
        .collect()
}

/// Removes every complete `<text>…</text>` from markup that could not be parsed.
pub(super) fn strip_text_fragments(markup: &str) -> String {
    text_fragment_regex().replace_all(markup, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_entities_become_numeric() {
        let repaired = repair_markup("<svg><text>Smith&nbsp;Co &copy; 2024</text></svg>").unwrap();
        assert_eq!(repaired, "<svg><text>Smith&#160;Co &#169; 2024</text></svg>");
    }

    #[test]
    fn test_bare_ampersands_are_escaped() {
        let repaired = repair_markup("<svg><text>R & D &bogus; &amp; &#38; &#x26;</text></svg>").unwrap();
        assert_eq!(
            repaired,
            "<svg><text>R &amp; D &amp;bogus; &amp; &#38; &#x26;</text></svg>"
        );
    }

    #[test]
    fn test_dtd_entities_are_kept() {
        let markup = r#"<!DOCTYPE svg [<!ENTITY ns_svg "http://www.w3.org/2000/svg">]><svg xmlns="&ns_svg;"><text>A & B</text></svg>"#;
        let repaired = repair_markup(markup).unwrap();
        assert!(repaired.contains(r#"xmlns="&ns_svg;""#));
        assert!(repaired.contains("A &amp; B"));
    }

    #[test]
    fn test_missing_prefixes_are_declared_on_root() {
        let repaired = repair_markup(
            r#"<svg viewBox="0 0 1 1"><image xlink:href="a.png"/><sodipodi:namedview inkscape:zoom="1"/></svg>"#,
        )
        .unwrap();
        assert!(repaired.starts_with(
            r#"<svg xmlns:sodipodi="urn:x-undeclared:sodipodi" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:inkscape="urn:x-undeclared:inkscape" viewBox="0 0 1 1">"#
        ));
    }

    #[test]
    fn test_declared_and_reserved_prefixes_are_left_alone() {
        let markup = r#"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><text xml:space="preserve">a</text><image xlink:href="b.png"/></svg>"#;
        assert_eq!(repair_markup(markup), None);
    }

    #[test]
    fn test_style_colons_are_not_prefixes() {
        let markup = r#"<svg><text style="fill: red; font-weight:bold">Time: 9 = late</text></svg>"#;
        assert_eq!(repair_markup(markup), None);
    }

    #[test]
    fn test_standalone_fragments_in_source_order() {
        let fragments = standalone_fragments(
            r#"<svg><g><text x="1" y="2">{{a}}</text><circle r="3"></circle><image xlink:href="x.png"/><text>unclosed</svg>"#,
        );
        assert_eq!(
            fragments,
            vec![
                r#"<svg><text x="1" y="2">{{a}}</text></svg>"#.to_string(),
                r#"<svg><circle r="3"/></svg>"#.to_string(),
                r#"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><image xlink:href="x.png"/></svg>"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_strip_text_fragments() {
        assert_eq!(
            strip_text_fragments(r#"<svg><g><rect/><text x="1">A</text><text>open</svg>"#),
            "<svg><g><rect/><text>open</svg>"
        );
    }
}
