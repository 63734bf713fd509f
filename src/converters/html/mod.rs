//! Converts SVG templates into editable HTML fragments with percentage-positioned CSS.
//!
//! The entry point is [`convert_svg_to_template`]. One pipeline serves both
//! layouts: decode, infer dimensions, extract elements, detect placeholders,
//! then assemble HTML and CSS for the requested [`LayoutMode`].
//!
//! # Current Features & Limitations:
//! *   Accepts raw markup, `data:` URIs (base64 or percent-encoded) and bare base64.
//! *   Repairs common malformations (HTML entities, stray `&`, undeclared
//!     `xlink:`) and otherwise keeps whatever tags are well-formed.
//! *   Extracts text, images, circles, ellipses, paths, rects, lines and groups in document order.
//! *   Detects `{{name}}`, `${name}`, `%name%` and `[name]` placeholders.
//! *   Only `translate()` transforms are honoured when positioning.
//! *   Path sizes are estimated, and text sits on an approximated baseline.

mod assemble;
mod config;
mod constants;
mod css;
mod decode;
mod dimensions;
mod error;
mod extract;
mod placeholders;
mod repair;
mod utils;

pub use assemble::{assemble_page, AssembledPage};
pub use config::ConverterConfig;
pub use decode::decode_svg_content;
pub use dimensions::infer_dimensions;
pub use error::{ConversionError, Result};
pub use extract::{background_markup, extract_elements};
pub use placeholders::{collect_placeholders, detect_placeholders, PlaceholderSyntax};

use crate::models::{
    elements::{walk_shapes, walk_text},
    request::{ConvertRequest, LayoutMode, DEFAULT_PAGE_TYPE, DEFAULT_TEMPLATE_NAME},
    result::ConversionResult,
};
use log::{debug, info};

/// Per-conversion labels and layout choice.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub page_type: String,
    pub name: String,
    pub mode: LayoutMode,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            page_type: DEFAULT_PAGE_TYPE.to_string(),
            name: DEFAULT_TEMPLATE_NAME.to_string(),
            mode: LayoutMode::default(),
        }
    }
}

impl From<&ConvertRequest> for ConvertOptions {
    fn from(request: &ConvertRequest) -> Self {
        Self {
            page_type: request.page_type().to_string(),
            name: request.name().to_string(),
            mode: request.mode(),
        }
    }
}

/// Converts an SVG template into HTML, CSS and a placeholder list.
///
/// The conversion is pure and deterministic: the same input always yields
/// byte-identical output. Malformed SVG is not an error; it produces a
/// template with no extracted elements.
///
/// # Arguments
/// * `svg_content` - Raw SVG markup, a `data:` URI, or bare base64.
/// * `options` - Page type, template name and layout.
/// * `config` - Fallback values for anything the SVG leaves unspecified.
///
/// # Returns
/// The `ConversionResult`, or a `ConversionError` if output generation fails.
pub fn convert_svg_to_template(
    svg_content: &str,
    options: &ConvertOptions,
    config: &ConverterConfig,
) -> Result<ConversionResult> {
    let markup = decode_svg_content(svg_content);
    let dims = infer_dimensions(&markup, config);
    let elements = extract_elements(&markup, config);

    let raw_markup = match options.mode {
        LayoutMode::Decomposed => Some(markup.as_str()),
        LayoutMode::Overlay => None,
    };
    let placeholders = collect_placeholders(&elements, raw_markup);

    let page = assemble_page(
        &elements,
        &markup,
        &dims,
        options.mode,
        &options.page_type,
        config,
    )?;

    let mut text_elements = 0;
    walk_text(&elements, &mut |_| text_elements += 1);
    let mut icon_elements = 0;
    walk_shapes(&elements, &mut |shape| {
        if shape.is_icon() {
            icon_elements += 1;
        }
    });

    debug!(
        "Converted with {:?} layout against a {}x{} viewBox",
        options.mode, dims.view_box_width, dims.view_box_height
    );
    info!(
        "Converted template '{}': {} text elements, {} icons, {} placeholders",
        options.name,
        text_elements,
        icon_elements,
        placeholders.len()
    );

    Ok(ConversionResult {
        html: page.html,
        css: page.css,
        placeholders,
        page_type: options.page_type.clone(),
        name: options.name.clone(),
        text_elements,
        icon_elements,
        dimensions: dims,
    })
}
