//! Standalone HTTP server for the SVG template conversion endpoint.
//!
//! Accepts the same JSON contract as the hosted edge function on `/` and
//! `/convert`, and can fetch `svgUrl` sources.

use anyhow::Context;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use svg_template_tools::{api::HttpReply, respond_with_fetch, ConverterConfig};

/// Request bodies carry whole SVG documents, often with embedded images.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DefaultPage {
    Letter,
    A4,
}

#[derive(Parser, Debug)]
#[command(name = "svg-template-server", version, about = "Converts SVG templates into editable HTML/CSS")]
struct ServerArgs {
    /// Address to listen on.
    #[arg(long, env = "SVG_TEMPLATE_BIND", default_value = "0.0.0.0:8787")]
    bind: SocketAddr,

    /// Page size assumed for SVGs without a viewBox or width/height.
    #[arg(long, env = "SVG_TEMPLATE_DEFAULT_PAGE", value_enum, default_value_t = DefaultPage::Letter)]
    default_page: DefaultPage,

    /// Timeout for fetching `svgUrl` sources, in seconds.
    #[arg(long, env = "SVG_TEMPLATE_FETCH_TIMEOUT", default_value_t = 10)]
    fetch_timeout_secs: u64,
}

struct AppState {
    config: ConverterConfig,
    http_client: reqwest::Client,
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(convert))
        .route("/convert", any(convert))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

async fn convert(State(state): State<Arc<AppState>>, method: Method, body: String) -> Response {
    let reply = respond_with_fetch(method.as_str(), &body, &state.config, &state.http_client).await;
    into_response(reply)
}

fn into_response(reply: HttpReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder().status(status);
    for (name, value) in &reply.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    match builder.body(Body::from(reply.body)) {
        Ok(response) => response,
        Err(e) => {
            warn!("Failed to build response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = ServerArgs::parse();

    let config = match args.default_page {
        DefaultPage::Letter => ConverterConfig::letter(),
        DefaultPage::A4 => ConverterConfig::a4(),
    };
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.fetch_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let state = Arc::new(AppState { config, http_client });
    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;

    info!(
        "Listening on {} (default page {:?}, fetch timeout {}s)",
        args.bind, args.default_page, args.fetch_timeout_secs
    );
    axum::serve(listener, app(state)).await.context("Server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(Arc::new(AppState {
            config: ConverterConfig::default(),
            http_client: reqwest::Client::new(),
        }))
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_preflight() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-methods"],
            "POST, OPTIONS"
        );
        assert!(body_string(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_convert_route() {
        let request = serde_json::json!({
            "svgContent": r#"<svg viewBox="0 0 200 200"><circle cx="50" cy="50" r="10"/><text x="10" y="10">{{headline}}</text></svg>"#,
            "mode": "decomposed",
        });
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/convert")
                    .header("content-type", "application/json")
                    .body(Body::from(request.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["placeholders"], serde_json::json!(["headline"]));
        assert_eq!(body["iconElements"], 1);
    }

    #[tokio::test]
    async fn test_missing_content_and_wrong_method() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = test_app()
            .oneshot(Request::builder().uri("/convert").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_args_defaults() {
        let args = ServerArgs::try_parse_from(["svg-template-server", "--default-page", "a4"]).unwrap();
        assert_eq!(args.default_page, DefaultPage::A4);
        assert_eq!(args.fetch_timeout_secs, 10);
    }
}
