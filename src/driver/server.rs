//! HTTP Server
//!
//! 処理エンドポイント（`POST /api/remove-bg`）とヘルスチェック

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::application::dto::processing_response::ProcessingResponse;
use crate::application::use_cases::remove_background::{
    RemoveBackgroundError, RemoveBackgroundUseCase,
};
use crate::domain::entities::session::Credentials;
use crate::domain::repositories::inference_backend::InferenceBackend;
use crate::domain::repositories::session_provider::SessionProvider;

pub type DynRemoveBackgroundUseCase =
    RemoveBackgroundUseCase<dyn SessionProvider, dyn InferenceBackend>;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub remove_background: Arc<DynRemoveBackgroundUseCase>,
}

impl AppState {
    pub fn new(
        session_provider: Arc<dyn SessionProvider>,
        backend: Arc<dyn InferenceBackend>,
    ) -> Self {
        Self {
            remove_background: Arc::new(RemoveBackgroundUseCase::new(session_provider, backend)),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "productai".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// リクエストヘッダーから資格情報を取り出す
pub fn credentials_from_headers(headers: &HeaderMap) -> Credentials {
    let header = |name| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    };

    Credentials {
        cookie: header(COOKIE),
        authorization: header(AUTHORIZATION),
    }
}

/// POST /api/remove-bg
///
/// Body is the raw storage URL of the uploaded image; the session is checked
/// before the body is decoded.
pub async fn remove_bg(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<ProcessingResponse>) {
    let credentials = credentials_from_headers(&headers);

    match state.remove_background.execute(&credentials, &body).await {
        Ok(image) => (StatusCode::OK, Json(ProcessingResponse::success(image))),
        Err(RemoveBackgroundError::Unauthorized(_)) => (
            StatusCode::UNAUTHORIZED,
            Json(ProcessingResponse::unauthenticated()),
        ),
        Err(e @ RemoveBackgroundError::InvalidImageUrl) => (
            StatusCode::BAD_REQUEST,
            Json(ProcessingResponse::failure(e.to_string())),
        ),
        Err(RemoveBackgroundError::Processing(e)) => (
            StatusCode::BAD_GATEWAY,
            Json(ProcessingResponse::failure(e.to_string())),
        ),
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/remove-bg", post(remove_bg))
        .route("/health", get(health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_credentials_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("next-auth.session-token=abc"),
        );
        headers.insert(AUTHORIZATION, HeaderValue::from_static("  "));

        let credentials = credentials_from_headers(&headers);
        assert_eq!(
            credentials.cookie.as_deref(),
            Some("next-auth.session-token=abc")
        );
        assert!(credentials.authorization.is_none());
    }

    #[test]
    fn test_credentials_from_empty_headers() {
        assert!(credentials_from_headers(&HeaderMap::new()).is_empty());
    }
}
