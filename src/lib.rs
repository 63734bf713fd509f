pub mod api;
pub mod client;
pub mod converters;
pub mod errors;
pub mod models;

pub use api::{respond, respond_with_fetch, HttpReply};
pub use client::fetch_svg;
pub use converters::html::{convert_svg_to_template, ConvertOptions, ConverterConfig};
pub use errors::{Result, TemplateApiError};
pub use models::result::ConversionResult;

// features
pub mod diff;
pub use diff::compare_results;
#[cfg(feature = "diff")]
pub use diff::comparer::ComparerBuilder;

use wasm_bindgen::prelude::*;

/// Routes `log` output to the browser console and, with the
/// `console_error_panic_hook` feature, panics to `console.error`.
/// Calling it more than once is harmless.
#[wasm_bindgen]
pub fn init_logging() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("Logging initialized");
    }
}

/// Handles one conversion request from a JS host.
///
/// Returns the serialized `HttpReply` (`{ status, headers, body }`) for the
/// host to turn into its own response type. `svgUrl` is not fetched here.
#[wasm_bindgen]
pub fn convert_svg_template(method: &str, body: &str) -> String {
    let reply = api::respond(method, body, &ConverterConfig::default());
    serde_json::to_string(&reply).unwrap_or_else(|e| {
        log::warn!("Failed to serialize reply: {}", e);
        r#"{"status":500,"headers":{},"body":"{\"error\":\"Failed to serialize response\"}"}"#
            .to_string()
    })
}
