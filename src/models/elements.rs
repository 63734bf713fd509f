// src/models/elements.rs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An axis-aligned box in viewBox units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A translation inherited from enclosing groups (and the element's own
/// `translate()`), in viewBox units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    /// Returns the sum of two offsets.
    pub fn then(self, other: Offset) -> Offset {
        Offset {
            dx: self.dx + other.dx,
            dy: self.dy + other.dy,
        }
    }
}

/// Horizontal alignment of SVG text relative to its anchor point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAnchor {
    /// Parses an SVG `text-anchor` value. Unknown values map to `Start`.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "middle" => TextAnchor::Middle,
            "end" => TextAnchor::End,
            _ => TextAnchor::Start,
        }
    }

    /// The CSS `text-align` equivalent.
    pub fn text_align(&self) -> &'static str {
        match self {
            TextAnchor::Middle => "center",
            TextAnchor::End => "right",
            TextAnchor::Start => "left",
        }
    }
}

/// A `<text>` element, flattened to its visible content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    /// Generated id, unique within one conversion (`text-N`).
    pub id: String,
    /// The `id` attribute of the source element, if any.
    pub source_id: Option<String>,
    /// Concatenated, whitespace-normalized text of the element and its `<tspan>`s.
    pub content: String,
    /// Anchor point x (includes inherited translation).
    pub x: f64,
    /// Baseline y (includes inherited translation).
    pub y: f64,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: String,
    pub fill: String,
    pub text_anchor: TextAnchor,
    /// The placeholder name detected in `content`, if any.
    pub placeholder_name: Option<String>,
}

impl TextElement {
    pub fn is_placeholder(&self) -> bool {
        self.placeholder_name.is_some()
    }
}

/// The geometry specific to each supported shape tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ShapeKind {
    Image { href: Option<String> },
    Circle { cx: f64, cy: f64, r: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Path { d: String },
    Rect { rx: f64, ry: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
}

impl ShapeKind {
    /// The SVG tag name this kind was extracted from.
    pub fn tag(&self) -> &'static str {
        match self {
            ShapeKind::Image { .. } => "image",
            ShapeKind::Circle { .. } => "circle",
            ShapeKind::Ellipse { .. } => "ellipse",
            ShapeKind::Path { .. } => "path",
            ShapeKind::Rect { .. } => "rect",
            ShapeKind::Line { .. } => "line",
        }
    }
}

/// A graphical (non-text) element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeElement {
    /// Generated id, unique within one conversion (`shape-N`).
    pub id: String,
    pub source_id: Option<String>,
    pub kind: ShapeKind,
    /// The element's original markup, verbatim.
    pub markup: String,
    /// Page-space bounding box (includes `offset`).
    pub bounds: Bounds,
    /// Translation inherited from enclosing groups. The element's own
    /// `transform` is still part of `markup`.
    pub offset: Offset,
    /// Captured presentation attributes (fill, stroke, ...), in source order.
    pub paint: IndexMap<String, String>,
}

impl ShapeElement {
    /// Images, circles and paths count as icons in the conversion result.
    pub fn is_icon(&self) -> bool {
        matches!(
            self.kind,
            ShapeKind::Image { .. } | ShapeKind::Circle { .. } | ShapeKind::Path { .. }
        )
    }
}

/// A `<g>` element and its extracted children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupElement {
    /// Generated id, unique within one conversion (`group-N`).
    pub id: String,
    pub source_id: Option<String>,
    /// The raw `transform` attribute. Only its `translate()` part is applied
    /// to children; other functions are carried for reference.
    pub transform: Option<String>,
    /// Other captured attributes of the group (style, opacity, ...).
    pub attributes: IndexMap<String, String>,
    pub children: Vec<DrawingElement>,
}

/// A drawing primitive extracted from an SVG document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawingElement {
    Text(TextElement),
    Shape(ShapeElement),
    Group(GroupElement),
}

impl DrawingElement {
    pub fn id(&self) -> &str {
        match self {
            DrawingElement::Text(t) => &t.id,
            DrawingElement::Shape(s) => &s.id,
            DrawingElement::Group(g) => &g.id,
        }
    }
}

/// Visits every text element in document order, descending into groups.
pub fn walk_text<'a>(elements: &'a [DrawingElement], visit: &mut impl FnMut(&'a TextElement)) {
    for element in elements {
        match element {
            DrawingElement::Text(text) => visit(text),
            DrawingElement::Group(group) => walk_text(&group.children, visit),
            DrawingElement::Shape(_) => {}
        }
    }
}

/// Visits every shape element in document order, descending into groups.
pub fn walk_shapes<'a>(
    elements: &'a [DrawingElement],
    visit: &mut impl FnMut(&'a ShapeElement),
) {
    for element in elements {
        match element {
            DrawingElement::Shape(shape) => visit(shape),
            DrawingElement::Group(group) => walk_shapes(&group.children, visit),
            DrawingElement::Text(_) => {}
        }
    }
}
