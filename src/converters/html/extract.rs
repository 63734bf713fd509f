//! Extracts typed drawing primitives from SVG markup.
//!
//! The document is parsed with `roxmltree` and walked once, so elements come
//! out in document order with groups nested as in the source. Markup the
//! parser rejects is repaired and parsed again; if that fails too, the
//! well-formed text, image, circle and path tags are extracted one by one.
//!
//! # Known approximations
//! *   Only `translate()` is propagated from groups (and from an element's own
//!     `transform`) into positions. `scale`, `rotate`, `skew` and `matrix` are
//!     captured but not composed.
//! *   Path sizes are estimated from the numeric tokens of `d`, not computed.
//! *   Text is positioned by its baseline anchor point only; no font metrics.

use super::{
    config::ConverterConfig,
    constants::XLINK_NS,
    placeholders::primary_placeholder,
    repair::{repair_markup, standalone_fragments, strip_text_fragments},
    utils::{
        normalize_whitespace, numeric_tokens, parse_coordinate, parse_font_size, parse_length,
        parse_translate,
    },
};
use crate::models::elements::{
    Bounds, DrawingElement, GroupElement, Offset, ShapeElement, ShapeKind, TextAnchor, TextElement,
};
use indexmap::IndexMap;
use log::{debug, warn};
use roxmltree::{Document, Node, ParsingOptions};
use std::ops::Range;

/// Subtrees that hold no directly rendered content.
const SKIPPED_TAGS: &[&str] = &[
    "defs",
    "clipPath",
    "mask",
    "symbol",
    "style",
    "script",
    "title",
    "desc",
    "metadata",
    "linearGradient",
    "radialGradient",
    "pattern",
    "filter",
    "marker",
];

/// Presentation attributes carried over to `ShapeElement::paint`.
const PAINT_ATTRIBUTES: &[&str] = &[
    "fill",
    "fill-opacity",
    "stroke",
    "stroke-width",
    "stroke-opacity",
    "opacity",
];

fn parse_document(markup: &str) -> Result<Document<'_>, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(markup, options)
}

// --- Attribute Lookup ---

/// Looks a property up in the element's `style` attribute, then in the
/// presentation attribute of the same name. `style` wins, as in CSS.
fn presentation_value(node: Node<'_, '_>, name: &str) -> Option<String> {
    if let Some(style) = node.attribute("style") {
        for declaration in style.split(';') {
            if let Some((key, value)) = declaration.split_once(':') {
                if key.trim() == name && !value.trim().is_empty() {
                    return Some(value.trim().to_string());
                }
            }
        }
    }
    node.attribute(name).map(|v| v.trim().to_string())
}

/// Like `presentation_value`, but falls back to the nearest ancestor that sets
/// the property. Used for inheritable text properties.
fn inherited_value(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.ancestors()
        .filter(|n| n.is_element())
        .find_map(|n| presentation_value(n, name))
}

fn number_attr(node: Node<'_, '_>, name: &str) -> Option<f64> {
    node.attribute(name).and_then(parse_coordinate)
}

fn own_translate(node: Node<'_, '_>) -> Offset {
    node.attribute("transform")
        .map(parse_translate)
        .unwrap_or_default()
}

fn href(node: Node<'_, '_>) -> Option<String> {
    node.attribute("href")
        .or_else(|| node.attribute((XLINK_NS, "href")))
        .map(str::to_string)
}

// --- Walker ---

/// Walks a parsed document and turns elements into `DrawingElement`s,
/// handing out deterministic ids in document order.
struct Extractor<'c, 'input> {
    config: &'c ConverterConfig,
    source: &'input str,
    text_count: usize,
    shape_count: usize,
    group_count: usize,
}

impl<'c, 'input> Extractor<'c, 'input> {
    fn new(config: &'c ConverterConfig, source: &'input str) -> Self {
        Self {
            config,
            source,
            text_count: 0,
            shape_count: 0,
            group_count: 0,
        }
    }

    fn walk_children(&mut self, parent: Node<'_, '_>, offset: Offset) -> Vec<DrawingElement> {
        let mut out = Vec::new();
        for child in parent.children().filter(|n| n.is_element()) {
            self.visit(child, offset, &mut out);
        }
        out
    }

    fn visit(&mut self, node: Node<'_, '_>, offset: Offset, out: &mut Vec<DrawingElement>) {
        let tag = node.tag_name().name();
        if SKIPPED_TAGS.contains(&tag) {
            return;
        }
        match tag {
            "text" => {
                if let Some(text) = self.text(node, offset) {
                    out.push(DrawingElement::Text(text));
                }
            }
            "image" | "circle" | "ellipse" | "path" | "rect" | "line" => {
                out.push(DrawingElement::Shape(self.shape(node, offset)));
            }
            "g" => out.push(DrawingElement::Group(self.group(node, offset))),
            _ => {
                // Containers we do not model (<a>, <switch>, nested <svg>, foreign
                // namespaces): keep their content in place.
                debug!("Descending into unmodelled element <{}>", tag);
                let inner = offset.then(own_translate(node));
                let mut children = self.walk_children(node, inner);
                out.append(&mut children);
            }
        }
    }

    fn text(&mut self, node: Node<'_, '_>, offset: Offset) -> Option<TextElement> {
        let content = text_content(node);
        if content.is_empty() {
            debug!("Skipping <text> with empty content");
            return None;
        }

        // Position comes from the <text> itself, else from its first positioned <tspan>.
        let first_tspan = |name: &str| {
            node.descendants()
                .filter(|n| n.has_tag_name("tspan"))
                .find_map(|n| number_attr(n, name))
        };
        let position = offset.then(own_translate(node));
        let x = number_attr(node, "x").or_else(|| first_tspan("x")).unwrap_or(0.0) + position.dx;
        let y = number_attr(node, "y").or_else(|| first_tspan("y")).unwrap_or(0.0) + position.dy;

        let font_size = inherited_value(node, "font-size")
            .as_deref()
            .and_then(parse_font_size)
            .unwrap_or(self.config.default_font_size);
        let font_family = inherited_value(node, "font-family")
            .unwrap_or_else(|| self.config.default_font_family.clone());
        let font_weight = inherited_value(node, "font-weight")
            .unwrap_or_else(|| self.config.default_font_weight.clone());
        let fill =
            inherited_value(node, "fill").unwrap_or_else(|| self.config.default_fill.clone());
        let text_anchor = inherited_value(node, "text-anchor")
            .map(|v| TextAnchor::parse(&v))
            .unwrap_or_default();

        let id = format!("text-{}", self.text_count);
        self.text_count += 1;
        let placeholder_name = primary_placeholder(&content);

        Some(TextElement {
            id,
            source_id: node.attribute("id").map(str::to_string),
            content,
            x,
            y,
            font_size,
            font_family,
            font_weight,
            fill,
            text_anchor,
            placeholder_name,
        })
    }

    fn shape(&mut self, node: Node<'_, '_>, offset: Offset) -> ShapeElement {
        let num = |name: &str| number_attr(node, name).unwrap_or(0.0);
        let (kind, local) = match node.tag_name().name() {
            "image" => {
                let size = self.config.default_image_size;
                let width = node.attribute("width").and_then(parse_length).unwrap_or(size);
                let height = node.attribute("height").and_then(parse_length).unwrap_or(size);
                (
                    ShapeKind::Image { href: href(node) },
                    Bounds { x: num("x"), y: num("y"), width, height },
                )
            }
            "circle" => {
                let (cx, cy, r) = (num("cx"), num("cy"), num("r"));
                (
                    ShapeKind::Circle { cx, cy, r },
                    Bounds { x: cx - r, y: cy - r, width: 2.0 * r, height: 2.0 * r },
                )
            }
            "ellipse" => {
                let (cx, cy, rx, ry) = (num("cx"), num("cy"), num("rx"), num("ry"));
                (
                    ShapeKind::Ellipse { cx, cy, rx, ry },
                    Bounds { x: cx - rx, y: cy - ry, width: 2.0 * rx, height: 2.0 * ry },
                )
            }
            "path" => {
                let d = node.attribute("d").unwrap_or("").to_string();
                let (width, height) = estimate_path_size(&d, self.config.path_size_cap);
                // A path is placed by its own translate(), which own_translate adds below.
                (ShapeKind::Path { d }, Bounds { x: 0.0, y: 0.0, width, height })
            }
            "rect" => (
                ShapeKind::Rect { rx: num("rx"), ry: num("ry") },
                Bounds { x: num("x"), y: num("y"), width: num("width"), height: num("height") },
            ),
            _ => {
                let (x1, y1, x2, y2) = (num("x1"), num("y1"), num("x2"), num("y2"));
                (
                    ShapeKind::Line { x1, y1, x2, y2 },
                    Bounds {
                        x: x1.min(x2),
                        y: y1.min(y2),
                        width: (x2 - x1).abs(),
                        height: (y2 - y1).abs(),
                    },
                )
            }
        };

        let placement = offset.then(own_translate(node));
        let bounds = Bounds {
            x: local.x + placement.dx,
            y: local.y + placement.dy,
            ..local
        };

        let paint: IndexMap<String, String> = PAINT_ATTRIBUTES
            .iter()
            .filter_map(|name| presentation_value(node, name).map(|v| (name.to_string(), v)))
            .collect();

        let id = format!("shape-{}", self.shape_count);
        self.shape_count += 1;
        debug!("Extracted <{}> as {} at {:?}", kind.tag(), id, bounds);

        ShapeElement {
            id,
            source_id: node.attribute("id").map(str::to_string),
            kind,
            markup: self.source[node.range()].to_string(),
            bounds,
            offset,
            paint,
        }
    }

    fn group(&mut self, node: Node<'_, '_>, offset: Offset) -> GroupElement {
        let id = format!("group-{}", self.group_count);
        self.group_count += 1;

        let transform = node.attribute("transform").map(str::to_string);
        let attributes: IndexMap<String, String> = node
            .attributes()
            .filter(|a| a.namespace().is_none() && !matches!(a.name(), "id" | "transform"))
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect();

        let children = self.walk_children(node, offset.then(own_translate(node)));

        GroupElement {
            id,
            source_id: node.attribute("id").map(str::to_string),
            transform,
            attributes,
            children,
        }
    }
}

/// Concatenates the text of a `<text>` element and its `<tspan>`s.
/// A `<tspan>` that sets its own x or y starts a new line and is separated by a space.
fn text_content(node: Node<'_, '_>) -> String {
    let mut raw = String::new();
    for descendant in node.descendants() {
        if descendant.has_tag_name("tspan")
            && (descendant.has_attribute("x") || descendant.has_attribute("y"))
            && !raw.is_empty()
        {
            raw.push(' ');
        }
        if descendant.is_text() {
            if let Some(text) = descendant.text() {
                raw.push_str(text);
            }
        }
    }
    normalize_whitespace(&raw)
}

/// Estimates a path's size from its `d` data: the largest even-indexed token is
/// taken as the width and the largest odd-indexed one as the height, each
/// capped at `cap`.
fn estimate_path_size(d: &str, cap: f64) -> (f64, f64) {
    let tokens = numeric_tokens(d);
    let width = tokens.iter().step_by(2).fold(0.0_f64, |acc, v| acc.max(*v));
    let height = tokens.iter().skip(1).step_by(2).fold(0.0_f64, |acc, v| acc.max(*v));
    (width.min(cap), height.min(cap))
}

fn extract_document(doc: &Document<'_>, source: &str, config: &ConverterConfig) -> Vec<DrawingElement> {
    let mut extractor = Extractor::new(config, source);
    let elements = extractor.walk_children(doc.root_element(), Offset::default());
    debug!(
        "Extracted {} text, {} shape and {} group elements",
        extractor.text_count, extractor.shape_count, extractor.group_count
    );
    elements
}

/// Extracts from each standalone fragment in turn. Ids keep counting across
/// fragments, so they stay unique and in source order.
fn extract_fragments(markup: &str, config: &ConverterConfig) -> Vec<DrawingElement> {
    let fragments = standalone_fragments(markup);
    let mut extractor = Extractor::new(config, "");
    let mut elements = Vec::new();
    for fragment in &fragments {
        match parse_document(fragment) {
            Ok(doc) => {
                extractor.source = fragment.as_str();
                let mut found = extractor.walk_children(doc.root_element(), Offset::default());
                elements.append(&mut found);
            }
            Err(e) => debug!("Skipping malformed fragment {:?}: {}", fragment, e),
        }
    }
    debug!(
        "Recovered {} text and {} shape elements from {} fragments",
        extractor.text_count,
        extractor.shape_count,
        fragments.len()
    );
    elements
}

/// Extracts the drawing elements of an SVG document, in document order.
///
/// Never fails. Markup the XML parser rejects is repaired (HTML entities,
/// stray `&`, undeclared namespace prefixes) and parsed again. If it still
/// does not parse, the well-formed `<text>`, `<image>`, `<circle>` and
/// `<path>` tags are extracted individually and the rest is skipped.
///
/// # Arguments
/// * `markup` - The decoded SVG markup.
/// * `config` - Default values for missing text and image properties.
pub fn extract_elements(markup: &str, config: &ConverterConfig) -> Vec<DrawingElement> {
    let error = match parse_document(markup) {
        Ok(doc) => return extract_document(&doc, markup, config),
        Err(e) => e,
    };

    let repaired = repair_markup(markup);
    if let Some(repaired) = &repaired {
        match parse_document(repaired) {
            Ok(doc) => {
                warn!("Repaired malformed SVG markup ({})", error);
                return extract_document(&doc, repaired, config);
            }
            Err(e) => debug!("Repaired markup still does not parse: {}", e),
        }
    }

    warn!(
        "SVG markup could not be parsed ({}); extracting well-formed elements one by one",
        error
    );
    extract_fragments(repaired.as_deref().unwrap_or(markup), config)
}

/// Removes the ranges of every `<text>` element under the root.
fn strip_text(doc: &Document<'_>, source: &str) -> String {
    let root = doc.root_element();
    let text_ranges: Vec<Range<usize>> = root
        .descendants()
        .filter(|n| n.has_tag_name("text"))
        .map(|n| n.range())
        .collect();

    let root_range = root.range();
    let mut out = String::with_capacity(root_range.len());
    let mut cursor = root_range.start;
    for range in text_ranges {
        // Nested <text> ranges fall inside one already removed.
        if range.start < cursor {
            continue;
        }
        out.push_str(&source[cursor..range.start]);
        cursor = range.end;
    }
    out.push_str(&source[cursor..root_range.end]);
    out
}

/// Returns the root `<svg>` element's markup with every `<text>` element removed,
/// for use as the background layer of the overlay layout.
///
/// Malformed markup is repaired as in [`extract_elements`]. When even that
/// fails, the span from the first `<svg` to the last `</svg>` is returned with
/// its complete `<text>…</text>` elements cut out; input with no `<svg`
/// yields an empty string.
pub fn background_markup(markup: &str) -> String {
    if let Ok(doc) = parse_document(markup) {
        return strip_text(&doc, markup);
    }
    if let Some(repaired) = repair_markup(markup) {
        if let Ok(doc) = parse_document(&repaired) {
            return strip_text(&doc, &repaired);
        }
    }
    match (markup.find("<svg"), markup.rfind("</svg>")) {
        (Some(start), Some(end)) if end > start => {
            strip_text_fragments(&markup[start..end + "</svg>".len()])
        }
        _ => String::new(),
    }
}
