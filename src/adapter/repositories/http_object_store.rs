//! HTTP Object Store Implementation
//!
//! ObjectStoreのHTTP PUT実装（S3互換バケットや署名済みURLベースへのアップロード）

use anyhow::{bail, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use uuid::Uuid;

use crate::adapter::config::Config;
use crate::adapter::http::{build_http_client, error_chain_to_string};
use crate::domain::entities::image::UploadedAsset;
use crate::domain::entities::upload_candidate::UploadCandidate;
use crate::domain::errors::StorageError;
use crate::domain::repositories::object_store::ObjectStore;

const KEY_PREFIX: &str = "uploads";

/// HTTPオブジェクトストア
pub struct HttpObjectStore {
    http_client: reqwest::Client,
    upload_base_url: String,
    public_base_url: String,
}

impl HttpObjectStore {
    /// 新しいストアを作成
    ///
    /// # Errors
    ///
    /// アップロード先URLが設定されていない場合にエラーを返す
    pub fn new(config: &Config) -> Result<Self> {
        if config.storage_upload_url.trim().is_empty() {
            bail!("storage_upload_url is not configured");
        }

        Ok(Self {
            http_client: build_http_client(config.request_timeout_secs)?,
            upload_base_url: config.storage_upload_url.trim_end_matches('/').to_string(),
            public_base_url: config.public_base_url().trim_end_matches('/').to_string(),
        })
    }

    /// `uploads/{uuid}.{ext}` 形式のキーを生成
    pub fn object_key(candidate: &UploadCandidate) -> String {
        format!("{}/{}.{}", KEY_PREFIX, Uuid::new_v4(), candidate.extension())
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn upload(&self, candidate: &UploadCandidate) -> Result<UploadedAsset, StorageError> {
        let key = Self::object_key(candidate);
        let upload_url = format!("{}/{}", self.upload_base_url, key);

        debug!("PUT {} ({} bytes)", upload_url, candidate.size());

        let response = self
            .http_client
            .put(&upload_url)
            .header(CONTENT_TYPE, candidate.content_type())
            .body(candidate.content().to_vec())
            .send()
            .await
            .map_err(|e| StorageError::Upload(error_chain_to_string(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Upload(format!("{} {}", status, body).trim().to_string()));
        }

        Ok(UploadedAsset::new(
            key.clone(),
            format!("{}/{}", self.public_base_url, key),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::http::test_support::spawn_fake_server;
    use axum::body::Bytes;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::put;
    use axum::Router;
    use std::sync::{Arc, Mutex};

    type Received = Arc<Mutex<Vec<(String, String, usize)>>>;

    async fn receive(
        State(received): State<Received>,
        Path(key): Path<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> StatusCode {
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        received.lock().unwrap().push((key, content_type, body.len()));
        StatusCode::OK
    }

    fn config(upload: &str, public: Option<&str>) -> Config {
        Config {
            storage_upload_url: upload.to_string(),
            storage_public_url: public.map(|p| p.to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_new_requires_upload_url() {
        assert!(HttpObjectStore::new(&Config::default()).is_err());
    }

    #[test]
    fn test_object_key_format() {
        let candidate = UploadCandidate::new("shoe.jpeg", "image/jpeg", vec![1u8]);
        let key = HttpObjectStore::object_key(&candidate);
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with(".jpeg"));
        assert_ne!(key, HttpObjectStore::object_key(&candidate));
    }

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let received: Received = Arc::default();
        let router = Router::new()
            .route("/uploads/:key", put(receive))
            .with_state(received.clone());
        let base = spawn_fake_server(router).await;

        let store =
            HttpObjectStore::new(&config(&base, Some("https://cdn.example.com/"))).unwrap();
        let candidate = UploadCandidate::new("x.png", "image/png", vec![0u8; 2048]);

        let asset = store.upload(&candidate).await.unwrap();

        assert!(asset.url.starts_with("https://cdn.example.com/uploads/"));
        assert!(asset.url.ends_with(".png"));
        assert!(asset.url.ends_with(&asset.key));

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].1, "image/png");
        assert_eq!(received[0].2, 2048);
    }

    #[tokio::test]
    async fn test_upload_failure_status() {
        let router = Router::new().route(
            "/uploads/:key",
            put(|| async { (StatusCode::FORBIDDEN, "AccessDenied") }),
        );
        let base = spawn_fake_server(router).await;

        let store = HttpObjectStore::new(&config(&base, None)).unwrap();
        let candidate = UploadCandidate::new("x.png", "image/png", vec![0u8; 16]);

        let err = store.upload(&candidate).await.unwrap_err();
        assert_eq!(
            err,
            StorageError::Upload("403 Forbidden AccessDenied".to_string())
        );
    }

    #[tokio::test]
    async fn test_upload_connection_refused() {
        // 到達不能なポート
        let store = HttpObjectStore::new(&config("http://127.0.0.1:1", None)).unwrap();
        let candidate = UploadCandidate::new("x.png", "image/png", vec![0u8; 16]);

        assert!(matches!(
            store.upload(&candidate).await,
            Err(StorageError::Upload(_))
        ));
    }
}
