//! HTTP Processing Endpoint Implementation
//!
//! ProcessingEndpointのHTTP実装（ストレージURLを生のボディとしてPOST）

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::header::{CONTENT_TYPE, COOKIE};

use crate::adapter::config::Config;
use crate::adapter::http::{build_http_client, error_chain_to_string};
use crate::application::dto::processing_response::ProcessingResponse;
use crate::domain::entities::image::ProcessedImage;
use crate::domain::errors::ProcessingError;
use crate::domain::repositories::processing_endpoint::ProcessingEndpoint;

/// セッションCookie名
pub const SESSION_COOKIE: &str = "next-auth.session-token";

/// HTTP処理エンドポイントクライアント
pub struct HttpProcessingEndpoint {
    http_client: reqwest::Client,
    endpoint_url: String,
    session_token: Option<String>,
}

impl HttpProcessingEndpoint {
    pub fn new(config: &Config, session_token: Option<String>) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(config.request_timeout_secs)?,
            endpoint_url: config.endpoint_url.clone(),
            session_token,
        })
    }
}

#[async_trait]
impl ProcessingEndpoint for HttpProcessingEndpoint {
    async fn process(&self, image_url: &str) -> Result<ProcessedImage, ProcessingError> {
        let mut request = self
            .http_client
            .post(&self.endpoint_url)
            .header(CONTENT_TYPE, "text/plain")
            .body(image_url.to_string());

        if let Some(token) = &self.session_token {
            request = request.header(COOKIE, format!("{}={}", SESSION_COOKIE, token));
        }

        debug!("POST {} with {}", self.endpoint_url, image_url);

        let response = request
            .send()
            .await
            .map_err(|e| ProcessingError::Network(error_chain_to_string(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProcessingError::Network(error_chain_to_string(&e)))?;

        let parsed: Result<ProcessingResponse, _> = serde_json::from_str(&body);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|r| r.message)
                .unwrap_or(body);
            return Err(ProcessingError::Status {
                status: status.as_u16(),
                message,
            });
        }

        parsed
            .map_err(|e| ProcessingError::MalformedResponse(e.to_string()))?
            .into_processed_image()
    }
}
