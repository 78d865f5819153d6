//! # Processing Endpoint Trait
//!
//! クライアント側から見た背景除去エンドポイント

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::image::ProcessedImage;
use crate::domain::errors::ProcessingError;

/// 処理エンドポイント
///
/// ストレージURLを送信し、処理済み画像の参照を受け取る
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProcessingEndpoint: Send + Sync {
    /// ストレージURLの画像を処理する
    ///
    /// # Errors
    ///
    /// 通信エラー、不正なレスポンス、非成功の応答で `ProcessingError` を返す
    async fn process(&self, image_url: &str) -> Result<ProcessedImage, ProcessingError>;
}
