//! The JSON request/response contract of the template conversion endpoint.
//!
//! Hosts (the axum server binary, the WebAssembly export) hand over the HTTP
//! method and raw body and get back an [`HttpReply`] with status, CORS headers
//! and a JSON body. Nothing here depends on a particular HTTP framework.

use crate::converters::html::{convert_svg_to_template, ConvertOptions, ConverterConfig};
use crate::errors::{Result, TemplateApiError};
use crate::models::{request::ConvertRequest, result::ConversionResult};
use indexmap::IndexMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
pub const ALLOW_METHODS: &str = "POST, OPTIONS";

/// The body of a successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub success: bool,
    pub html: String,
    pub css: String,
    pub placeholders: Vec<String>,
    pub page_type: String,
    pub name: String,
    pub text_elements: usize,
    pub icon_elements: usize,
}

impl From<ConversionResult> for ConvertResponse {
    fn from(result: ConversionResult) -> Self {
        Self {
            success: true,
            html: result.html,
            css: result.css,
            placeholders: result.placeholders,
            page_type: result.page_type,
            name: result.name,
            text_elements: result.text_elements,
            icon_elements: result.icon_elements,
        }
    }
}

/// The body of a failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A framework-independent HTTP response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpReply {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    pub body: String,
}

impl HttpReply {
    fn with_cors(status: u16, body: String) -> Self {
        let mut headers = IndexMap::new();
        headers.insert("Access-Control-Allow-Origin".to_string(), ALLOW_ORIGIN.to_string());
        headers.insert("Access-Control-Allow-Headers".to_string(), ALLOW_HEADERS.to_string());
        headers.insert("Access-Control-Allow-Methods".to_string(), ALLOW_METHODS.to_string());
        Self { status, headers, body }
    }

    /// The empty 200 answer to a CORS preflight.
    pub fn preflight() -> Self {
        Self::with_cors(200, String::new())
    }

    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => {
                let mut reply = Self::with_cors(status, body);
                reply
                    .headers
                    .insert("Content-Type".to_string(), "application/json".to_string());
                reply
            }
            Err(e) => {
                warn!("Failed to serialize response body: {}", e);
                let mut reply =
                    Self::with_cors(500, r#"{"error":"Failed to serialize response"}"#.to_string());
                reply
                    .headers
                    .insert("Content-Type".to_string(), "application/json".to_string());
                reply
            }
        }
    }

    /// A JSON `{ "error": ... }` reply with the error's status code.
    pub fn from_error(err: &TemplateApiError) -> Self {
        let status = err.status_code();
        if status >= 500 {
            warn!("Template conversion request failed ({}): {}", status, err);
        } else {
            info!("Rejected template conversion request ({}): {}", status, err);
        }
        Self::json(status, &ErrorResponse { error: err.to_string() })
    }

    fn from_result(result: Result<ConversionResult>) -> Self {
        match result {
            Ok(result) => Self::json(200, &ConvertResponse::from(result)),
            Err(err) => Self::from_error(&err),
        }
    }
}

/// What an incoming request asks for.
enum Incoming {
    Preflight,
    Convert(ConvertRequest),
}

fn parse_incoming(method: &str, body: &str) -> Result<Incoming> {
    match method.to_ascii_uppercase().as_str() {
        "OPTIONS" => Ok(Incoming::Preflight),
        "POST" => Ok(Incoming::Convert(serde_json::from_str(body)?)),
        other => Err(TemplateApiError::MethodNotAllowed(other.to_string())),
    }
}

fn convert(request: &ConvertRequest, svg_content: &str, config: &ConverterConfig) -> Result<ConversionResult> {
    let options = ConvertOptions::from(request);
    Ok(convert_svg_to_template(svg_content, &options, config)?)
}

/// Handles one request without network access.
///
/// `svgUrl` is not fetched here; a request that only carries `svgUrl` is
/// rejected with 400. Use [`respond_with_fetch`] where fetching is possible.
///
/// # Arguments
/// * `method` - The HTTP method, case-insensitive.
/// * `body` - The raw request body.
/// * `config` - Converter defaults.
pub fn respond(method: &str, body: &str, config: &ConverterConfig) -> HttpReply {
    let request = match parse_incoming(method, body) {
        Ok(Incoming::Preflight) => return HttpReply::preflight(),
        Ok(Incoming::Convert(request)) => request,
        Err(err) => return HttpReply::from_error(&err),
    };

    let result = match (request.content(), request.url()) {
        (Some(content), _) => convert(&request, content, config),
        (None, Some(_)) => Err(TemplateApiError::InvalidInput(
            "svgUrl cannot be fetched by this host; send svgContent instead".to_string(),
        )),
        (None, None) => Err(TemplateApiError::MissingContent),
    };
    HttpReply::from_result(result)
}

/// Handles one request, fetching `svgUrl` when `svgContent` is absent.
///
/// Inline content always takes precedence over the URL.
///
/// # Arguments
/// * `method` - The HTTP method, case-insensitive.
/// * `body` - The raw request body.
/// * `config` - Converter defaults.
/// * `http_client` - Client used for `svgUrl` fetches.
pub async fn respond_with_fetch(
    method: &str,
    body: &str,
    config: &ConverterConfig,
    http_client: &reqwest::Client,
) -> HttpReply {
    let request = match parse_incoming(method, body) {
        Ok(Incoming::Preflight) => return HttpReply::preflight(),
        Ok(Incoming::Convert(request)) => request,
        Err(err) => return HttpReply::from_error(&err),
    };

    let result = match (request.content(), request.url()) {
        (Some(content), _) => convert(&request, content, config),
        (None, Some(url)) => match crate::client::fetch_svg(url, http_client).await {
            Ok(markup) => convert(&request, &markup, config),
            Err(err) => Err(err),
        },
        (None, None) => Err(TemplateApiError::MissingContent),
    };
    HttpReply::from_result(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn config() -> ConverterConfig {
        ConverterConfig::default()
    }

    fn body_json(reply: &HttpReply) -> Value {
        serde_json::from_str(&reply.body).unwrap()
    }

    fn assert_cors(reply: &HttpReply) {
        assert_eq!(reply.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(
            reply.headers["Access-Control-Allow-Headers"],
            "authorization, x-client-info, apikey, content-type"
        );
    }

    #[test]
    fn test_options_preflight() {
        let reply = respond("OPTIONS", "", &config());
        assert_eq!(reply.status, 200);
        assert!(reply.body.is_empty());
        assert_cors(&reply);
    }

    #[test]
    fn test_missing_content_is_400() {
        let reply = respond("POST", r#"{"pageType":"text"}"#, &config());
        assert_eq!(reply.status, 400);
        assert_eq!(body_json(&reply), json!({ "error": "svgContent is required" }));
        assert_cors(&reply);

        let reply = respond("POST", r#"{"svgContent":"   "}"#, &config());
        assert_eq!(reply.status, 400);
    }

    #[test]
    fn test_invalid_json_is_500() {
        let reply = respond("POST", "{not json", &config());
        assert_eq!(reply.status, 500);
        assert_cors(&reply);
        let body = body_json(&reply);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[test]
    fn test_other_methods_are_405() {
        let reply = respond("GET", "", &config());
        assert_eq!(reply.status, 405);
        assert_cors(&reply);
    }

    #[test]
    fn test_url_only_without_fetch_is_400() {
        let reply = respond("POST", r#"{"svgUrl":"https://example.com/a.svg"}"#, &config());
        assert_eq!(reply.status, 400);
    }

    #[test]
    fn test_successful_conversion() {
        let request = json!({
            "svgContent": r#"<svg viewBox="0 0 200 100"><text x="100" y="50" text-anchor="middle">{{name}}</text></svg>"#,
            "pageType": "cover",
            "name": "Launch deck",
        });
        let reply = respond("post", &request.to_string(), &config());
        assert_eq!(reply.status, 200);
        assert_eq!(reply.headers["Content-Type"], "application/json");

        let body = body_json(&reply);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["placeholders"], json!(["name"]));
        assert_eq!(body["pageType"], json!("cover"));
        assert_eq!(body["name"], json!("Launch deck"));
        assert_eq!(body["textElements"], json!(1));
        assert_eq!(body["iconElements"], json!(0));
        assert!(body["css"].as_str().unwrap().contains("left: 50.00%"));
        assert!(body["html"].as_str().unwrap().contains(r#"data-page-type="cover""#));
    }

    #[test]
    fn test_defaults_and_decomposed_mode() {
        let request = json!({
            "svgContent": r#"<svg viewBox="0 0 100 100"><image href="{{logo}}" width="10" height="10"/></svg>"#,
            "mode": "decomposed",
        });
        let reply = respond("POST", &request.to_string(), &config());
        let body = body_json(&reply);
        assert_eq!(body["pageType"], json!("text"));
        assert_eq!(body["name"], json!("Untitled template"));
        assert_eq!(body["placeholders"], json!(["logo"]));
        assert_eq!(body["iconElements"], json!(1));
    }

    #[tokio::test]
    async fn test_fetch_errors_are_502() {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        // Nothing listens on port 9 of the loopback interface.
        let request = json!({ "svgUrl": "http://127.0.0.1:9/template.svg" });
        let reply = respond_with_fetch("POST", &request.to_string(), &config(), &client).await;
        assert_eq!(reply.status, 502);
        assert_cors(&reply);
    }

    #[tokio::test]
    async fn test_inline_content_wins_over_url() {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let request = json!({
            "svgContent": "<svg><text x=\"1\" y=\"1\">Hi</text></svg>",
            "svgUrl": "http://127.0.0.1:9/template.svg",
        });
        let reply = respond_with_fetch("POST", &request.to_string(), &config(), &client).await;
        assert_eq!(reply.status, 200);
        assert_eq!(body_json(&reply)["textElements"], json!(1));
    }
}
