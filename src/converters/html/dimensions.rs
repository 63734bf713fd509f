//! Infers the logical coordinate space of an SVG document.

use super::{config::ConverterConfig, utils::parse_length};
use crate::models::dimensions::Dimensions;
use log::debug;
use regex::Regex;
use std::sync::OnceLock;

fn root_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<svg\b[^>]*>").expect("regex must compile"))
}

fn attribute_regex(name: &'static str) -> Regex {
    // Attribute names are fixed literals, so this cannot fail.
    Regex::new(&format!(r#"\s{}\s*=\s*["']([^"']*)["']"#, name)).expect("regex must compile")
}

fn view_box_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| attribute_regex("viewBox"))
}

fn width_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| attribute_regex("width"))
}

fn height_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| attribute_regex("height"))
}

fn capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parses the width and height out of a viewBox value (`min-x min-y width height`).
/// The origin is ignored; non-zero viewBox origins are not supported.
fn parse_view_box(value: &str) -> Option<(f64, f64)> {
    let tokens: Vec<&str> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() < 4 {
        return None;
    }
    let width = tokens[2].parse::<f64>().ok()?;
    let height = tokens[3].parse::<f64>().ok()?;
    if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
        Some((width, height))
    } else {
        None
    }
}

/// Returns the `Dimensions` of an SVG document.
///
/// Looks at the root `<svg>` tag only: first its `viewBox`, then its
/// `width`/`height` attributes, then the configured default page size. Never
/// fails. A `viewBox` that is present but unusable selects the default page
/// without consulting `width`/`height`.
///
/// # Arguments
/// * `markup` - The raw SVG markup.
/// * `config` - Supplies the default page size.
pub fn infer_dimensions(markup: &str, config: &ConverterConfig) -> Dimensions {
    let root = root_tag_regex()
        .find(markup)
        .map(|m| m.as_str())
        .unwrap_or(markup);

    let declared_width = capture(width_regex(), root)
        .and_then(parse_length)
        .filter(|w| *w > 0.0);
    let declared_height = capture(height_regex(), root)
        .and_then(parse_length)
        .filter(|h| *h > 0.0);

    if let Some(view_box) = capture(view_box_regex(), root) {
        let Some((vb_width, vb_height)) = parse_view_box(view_box) else {
            debug!(
                "Unusable viewBox {:?}; using default page {}x{}",
                view_box, config.default_width, config.default_height
            );
            return Dimensions::uniform(config.default_width, config.default_height);
        };
        debug!("Using viewBox dimensions {}x{}", vb_width, vb_height);
        return Dimensions {
            width: declared_width.unwrap_or(vb_width),
            height: declared_height.unwrap_or(vb_height),
            view_box_width: vb_width,
            view_box_height: vb_height,
        };
    }

    if let (Some(width), Some(height)) = (declared_width, declared_height) {
        debug!("No usable viewBox; using width/height {}x{}", width, height);
        return Dimensions::uniform(width, height);
    }

    debug!(
        "No usable viewBox or size; using default page {}x{}",
        config.default_width, config.default_height
    );
    Dimensions::uniform(config.default_width, config.default_height)
}
