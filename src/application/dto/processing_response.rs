//! # Processing Response DTO
//!
//! `POST /api/remove-bg` のレスポンスボディ
//!
//! - 成功: `{"success":true,"data":"<画像参照>"}`
//! - 未認証: `{"message":"Not authenticated"}`
//! - 失敗: `{"success":false,"message":"<理由>"}`

use serde::{Deserialize, Serialize};

use crate::domain::entities::image::ProcessedImage;
use crate::domain::errors::ProcessingError;

/// 処理エンドポイントのレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProcessingResponse {
    pub fn success(image: ProcessedImage) -> Self {
        Self {
            success: Some(true),
            data: Some(image.into_url()),
            message: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            success: None,
            data: None,
            message: Some("Not authenticated".to_string()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            data: None,
            message: Some(message.into()),
        }
    }

    /// クライアント側でレスポンスを処理済み画像に変換する
    ///
    /// # Errors
    ///
    /// `success` が `true` でない場合、または `data` がない場合にエラーを返す
    pub fn into_processed_image(self) -> Result<ProcessedImage, ProcessingError> {
        match (self.success, self.data) {
            (Some(true), Some(data)) if !data.is_empty() => Ok(ProcessedImage::new(data)),
            (Some(true), _) => Err(ProcessingError::MalformedResponse(
                "missing data in successful response".to_string(),
            )),
            (_, _) => Err(ProcessingError::Rejected(
                self.message
                    .unwrap_or_else(|| "endpoint reported failure".to_string()),
            )),
        }
    }
}
