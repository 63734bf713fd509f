use serde::{Deserialize, Serialize};

/// The page type assumed when a request does not name one.
pub const DEFAULT_PAGE_TYPE: &str = "text";
/// The template name assumed when a request does not name one.
pub const DEFAULT_TEMPLATE_NAME: &str = "Untitled template";

/// Which HTML structure the converter emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// The original SVG as a background layer, with its text lifted into an
    /// editable, absolutely-positioned overlay.
    #[default]
    Overlay,
    /// Every element becomes its own positioned box.
    Decomposed,
}

/// The JSON body accepted by the template conversion endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    /// Raw SVG markup, a `data:` URI, or bare base64.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg_content: Option<String>,
    /// A URL to fetch the SVG from when `svg_content` is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<LayoutMode>,
}

impl ConvertRequest {
    /// The inline SVG content, treating an empty string as missing.
    pub fn content(&self) -> Option<&str> {
        self.svg_content.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// The remote SVG location, treating an empty string as missing.
    pub fn url(&self) -> Option<&str> {
        self.svg_url.as_deref().filter(|u| !u.trim().is_empty())
    }

    pub fn page_type(&self) -> &str {
        self.page_type.as_deref().unwrap_or(DEFAULT_PAGE_TYPE)
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_TEMPLATE_NAME)
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode.unwrap_or_default()
    }
}
