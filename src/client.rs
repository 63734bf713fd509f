use crate::errors::{Result, TemplateApiError};
use log::debug;
use reqwest::header::ACCEPT;

/// The longest error body excerpt carried into a `FetchFailed` message.
const ERROR_SNIPPET_LEN: usize = 500;

/// Fetches SVG markup from a remote location, such as a storage object URL.
///
/// # Arguments
///
/// * `svg_url` - An absolute `http` or `https` URL.
/// * `http_client` - An asynchronous `reqwest::Client` instance. Timeouts are
///   whatever the client was built with.
///
/// # Errors
///
/// Returns `TemplateApiError::InvalidInput` for an empty or non-HTTP URL,
/// `TemplateApiError::Network` when the request cannot be completed, and
/// `TemplateApiError::FetchFailed` for a non-success status.
///
/// # Returns
///
/// The response body as text. It is not validated as SVG; the converter is
/// best-effort about malformed markup.
pub async fn fetch_svg(svg_url: &str, http_client: &reqwest::Client) -> Result<String> {
    let svg_url = svg_url.trim();
    if svg_url.is_empty() {
        return Err(TemplateApiError::InvalidInput(
            "SVG URL cannot be empty".to_string(),
        ));
    }
    if !(svg_url.starts_with("http://") || svg_url.starts_with("https://")) {
        return Err(TemplateApiError::InvalidInput(format!(
            "SVG URL must use http or https: {}",
            svg_url
        )));
    }

    debug!("Fetching SVG from {}", svg_url);
    let response = http_client
        .get(svg_url)
        .header(ACCEPT, "image/svg+xml, text/plain;q=0.9, */*;q=0.8")
        .send()
        .await
        .map_err(TemplateApiError::Network)?;

    let status = response.status();
    if status.is_success() {
        let body = response.text().await.map_err(TemplateApiError::Network)?;
        debug!("Fetched {} bytes of SVG", body.len());
        Ok(body)
    } else {
        let error_text = response.text().await.map_err(TemplateApiError::Network)?;
        let snippet: String = error_text.chars().take(ERROR_SNIPPET_LEN).collect();
        Err(TemplateApiError::FetchFailed {
            status,
            message: format!("SVG request failed with status {}: {}", status, snippet),
        })
    }
}
