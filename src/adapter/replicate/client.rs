//! Replicate Inference Backend
//!
//! InferenceBackendのReplicate実装（予測の作成と完了までのポーリング）

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::AUTHORIZATION;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use super::models::{ModelRef, Prediction, PredictionInput, PredictionRequest, PredictionStatus};
use crate::adapter::config::Config;
use crate::adapter::http::{build_http_client, error_chain_to_string};
use crate::domain::entities::image::ProcessedImage;
use crate::domain::errors::ProcessingError;
use crate::domain::repositories::inference_backend::InferenceBackend;

/// Replicate が同期待機できる最大秒数
const MAX_PREFER_WAIT_SECS: u64 = 60;
/// 同期待機をHTTPタイムアウトより短くするための余裕
const PREFER_WAIT_MARGIN_SECS: u64 = 5;

/// `Prefer: wait=<n>` の秒数
///
/// HTTPタイムアウトより短く保ち、待機が切れた予測はポーリングで追う。
/// 余裕が取れない場合は同期待機しない
pub fn prefer_wait_secs(request_timeout_secs: u64) -> Option<u64> {
    let secs = request_timeout_secs
        .saturating_sub(PREFER_WAIT_MARGIN_SECS)
        .min(MAX_PREFER_WAIT_SECS);
    (secs > 0).then_some(secs)
}

/// Replicate バックエンド
pub struct ReplicateBackend {
    http_client: reqwest::Client,
    api_base: String,
    api_token: String,
    model: ModelRef,
    prefer_wait: Option<u64>,
    poll_interval: Duration,
    prediction_timeout: Duration,
}

impl ReplicateBackend {
    /// 設定とAPIトークンからバックエンドを作成
    pub fn new(config: &Config, api_token: String) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(config.request_timeout_secs)?,
            api_base: config.replicate_api_base.trim_end_matches('/').to_string(),
            api_token,
            model: config.model_ref()?,
            prefer_wait: prefer_wait_secs(config.request_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            prediction_timeout: Duration::from_secs(config.prediction_timeout_secs),
        })
    }

    pub fn model(&self) -> &ModelRef {
        &self.model
    }

    async fn create_prediction(&self, image_url: &str) -> Result<Prediction, ProcessingError> {
        let request = PredictionRequest {
            version: &self.model.version,
            input: PredictionInput { image: image_url },
        };
        let url = format!("{}/predictions", self.api_base);

        debug!("Creating prediction on {} for {}", self.model, image_url);

        let mut builder = self
            .http_client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_token));
        if let Some(secs) = self.prefer_wait {
            builder = builder.header("Prefer", format!("wait={}", secs));
        }

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| ProcessingError::Network(error_chain_to_string(&e)))?;

        Self::parse_prediction(response).await
    }

    async fn get_prediction(&self, url: &str) -> Result<Prediction, ProcessingError> {
        let response = self
            .http_client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_token))
            .send()
            .await
            .map_err(|e| ProcessingError::Network(error_chain_to_string(&e)))?;

        Self::parse_prediction(response).await
    }

    async fn parse_prediction(response: reqwest::Response) -> Result<Prediction, ProcessingError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProcessingError::Network(error_chain_to_string(&e)))?;

        if !status.is_success() {
            return Err(ProcessingError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ProcessingError::MalformedResponse(e.to_string()))
    }

    /// 終端状態になるまでポーリングする
    async fn wait_for_completion(
        &self,
        mut prediction: Prediction,
    ) -> Result<Prediction, ProcessingError> {
        let poll_url = prediction
            .urls
            .get
            .clone()
            .unwrap_or_else(|| format!("{}/predictions/{}", self.api_base, prediction.id));

        while !prediction.status.is_terminal() {
            debug!(
                "Prediction {} is {}, polling again in {:?}",
                prediction.id,
                prediction.status.as_str(),
                self.poll_interval
            );
            sleep(self.poll_interval).await;
            prediction = self.get_prediction(&poll_url).await?;
        }

        Ok(prediction)
    }

    fn into_image(prediction: Prediction) -> Result<ProcessedImage, ProcessingError> {
        match prediction.status {
            PredictionStatus::Succeeded => prediction
                .image_output()
                .map(ProcessedImage::new)
                .ok_or_else(|| {
                    ProcessingError::MalformedResponse(format!(
                        "prediction {} has no image output",
                        prediction.id
                    ))
                }),
            status => Err(ProcessingError::PredictionFailed {
                id: prediction.id.clone(),
                status: status.as_str().to_string(),
                message: prediction.error_message(),
            }),
        }
    }
}

#[async_trait]
impl InferenceBackend for ReplicateBackend {
    async fn remove_background(&self, image_url: &str) -> Result<ProcessedImage, ProcessingError> {
        let prediction = self.create_prediction(image_url).await?;
        let id = prediction.id.clone();
        info!("Prediction {} created ({})", id, prediction.status.as_str());

        let prediction = timeout(self.prediction_timeout, self.wait_for_completion(prediction))
            .await
            .map_err(|_| ProcessingError::Timeout(id))??;

        Self::into_image(prediction)
    }
}
