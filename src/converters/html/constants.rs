//! Defines constants used throughout the SVG to HTML conversion process.

// Default page size when the document declares neither a viewBox nor a size.
// US Letter in points (8.5in x 11in at 72pt/in).
pub const LETTER_WIDTH_PT: f64 = 612.0;
pub const LETTER_HEIGHT_PT: f64 = 792.0;
// A4 in points.
pub const A4_WIDTH_PT: f64 = 595.0;
pub const A4_HEIGHT_PT: f64 = 842.0;

// Default values used when specific text properties are missing.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";
pub const DEFAULT_FONT_WEIGHT: &str = "normal";
pub const DEFAULT_TEXT_FILL: &str = "#000000";

// Size given to <image> elements that carry no width/height.
pub const DEFAULT_IMAGE_SIZE: f64 = 50.0;
// Upper bound of the path size heuristic, in viewBox units.
pub const PATH_SIZE_CAP: f64 = 200.0;

// Physical page used by the print media rule.
pub const PRINT_PAGE_WIDTH: &str = "8.5in";
pub const PRINT_PAGE_HEIGHT: &str = "11in";

// CSS class names shared by the HTML and the stylesheet.
pub const PAGE_CLASS: &str = "svg-template-page";
pub const BACKGROUND_CLASS: &str = "svg-template-background";
pub const OVERLAY_CLASS: &str = "svg-template-overlay";
pub const TEXT_CLASS: &str = "text-element";
pub const SHAPE_CLASS: &str = "shape-element";
pub const GROUP_CLASS: &str = "group-element";

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
