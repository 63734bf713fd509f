use serde::{Deserialize, Serialize};

/// The logical coordinate space of an SVG document.
///
/// Computed once per conversion from the root `viewBox` (or the root
/// `width`/`height` attributes, or the configured default page size).
/// `view_box_width`/`view_box_height` are the denominators of every
/// percentage the converter emits; `width`/`height` are informational.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    /// The declared width of the document (root `width` attribute, else the viewBox width).
    pub width: f64,
    /// The declared height of the document (root `height` attribute, else the viewBox height).
    pub height: f64,
    /// The width of the user coordinate system.
    pub view_box_width: f64,
    /// The height of the user coordinate system.
    pub view_box_height: f64,
}

impl Dimensions {
    /// Dimensions whose declared size equals the coordinate system size.
    pub fn uniform(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            view_box_width: width,
            view_box_height: height,
        }
    }
}
