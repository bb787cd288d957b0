//! HTTP API
//!
//! `POST /api/scrape` に `{"url": "..."}` を送ると商品データを返す。

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::{FailureKind, ScraperError};
use crate::service::{ScrapeRequest, ScraperService};
use crate::traits::PageLoader;

/// リクエストボディ
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeBody {
    #[serde(default)]
    pub url: Option<String>,
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

impl IntoResponse for ScraperError {
    fn into_response(self) -> Response {
        let (status, body) = match self.kind() {
            FailureKind::MissingInput => (
                StatusCode::BAD_REQUEST,
                MessageResponse::new("URL is required."),
            ),
            FailureKind::InvalidInput => (
                StatusCode::BAD_REQUEST,
                MessageResponse::new("URL is invalid.").with_error(&self),
            ),
            FailureKind::NotAProductPage => (
                StatusCode::NOT_FOUND,
                MessageResponse::new(
                    "Could not automatically determine product details from the page.",
                ),
            ),
            FailureKind::PageLoadFailure => {
                error!("Scrape failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    MessageResponse::new("An error occurred on the server while scraping.")
                        .with_error(&self),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub async fn health() -> &'static str {
    "OK"
}

/// ボディが無い・JSONでない場合もURL未指定として扱う
pub async fn scrape<L: PageLoader + 'static>(
    State(service): State<ScraperService<L>>,
    body: Bytes,
) -> Response {
    let body: ScrapeBody = serde_json::from_slice(&body).unwrap_or_default();
    let url = body.url.unwrap_or_default();

    match service.oneshot(ScrapeRequest::new(url)).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(MessageResponse::new("Only POST requests are allowed.")),
    )
        .into_response()
}

pub fn router<L: PageLoader + 'static>(service: ScraperService<L>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/scrape",
            post(scrape::<L>).fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// HTTPサーバーを起動する
pub async fn serve<L: PageLoader + 'static>(
    addr: SocketAddr,
    service: ScraperService<L>,
) -> std::io::Result<()> {
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP API listening on {}", addr);
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::StubLoader;
    use axum::body::Body;
    use axum::http::Request;

    const GENERIC_PAGE: &str = r#"<html><body>
        <h1>Desk Lamp</h1>
        <span class="price">$24.00</span>
        <div class="product-image-container"><img src="/lamp.jpg"></div>
    </body></html>"#;

    fn app(loader: StubLoader) -> Router {
        router(ScraperService::with_loader(loader))
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/scrape")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_success_returns_record() {
        let (status, json) = send(
            app(StubLoader::html(GENERIC_PAGE)),
            post_json(r#"{"url": "https://shop.example.com/lamp"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Desk Lamp",
                "price": "$24.00",
                "imageUrl": "https://shop.example.com/lamp.jpg",
                "availableSizes": [],
                "availableColors": [],
            })
        );
    }

    #[tokio::test]
    async fn test_missing_url_is_bad_request() {
        for body in [r#"{}"#, r#"{"url": ""}"#, r#"{"url": null}"#, "", "not json"] {
            let (status, json) = send(app(StubLoader::html(GENERIC_PAGE)), post_json(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
            assert_eq!(json["message"], "URL is required.");
        }
    }

    #[tokio::test]
    async fn test_invalid_url_is_bad_request() {
        let (status, json) = send(
            app(StubLoader::html(GENERIC_PAGE)),
            post_json(r#"{"url": "javascript:alert(1)"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_not_a_product_page_is_not_found() {
        let (status, json) = send(
            app(StubLoader::html("<h1>Gadget</h1>")),
            post_json(r#"{"url": "https://shop.example.com/about"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            json["message"],
            "Could not automatically determine product details from the page."
        );
    }

    #[tokio::test]
    async fn test_page_load_failure_is_server_error() {
        let (status, json) = send(
            app(StubLoader::failing()),
            post_json(r#"{"url": "https://shop.example.com/lamp"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "An error occurred on the server while scraping.");
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("ERR_CONNECTION_REFUSED"));
    }

    #[tokio::test]
    async fn test_get_is_method_not_allowed() {
        let req = Request::builder()
            .method("GET")
            .uri("/api/scrape")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app(StubLoader::html(GENERIC_PAGE)), req).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json["message"], "Only POST requests are allowed.");
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app(StubLoader::failing()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
