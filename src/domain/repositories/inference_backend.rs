//! # Inference Backend Trait
//!
//! 背景除去モデルの呼び出しを抽象化

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::image::ProcessedImage;
use crate::domain::errors::ProcessingError;

/// 推論バックエンド
///
/// 画像URLを受け取り、背景を除去した画像の参照を返す外部サービス
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// 背景を除去する
    ///
    /// # Arguments
    ///
    /// * `image_url` - 入力画像の公開URL
    ///
    /// # Errors
    ///
    /// リモート呼び出しの失敗、または非成功の応答で `ProcessingError` を返す
    async fn remove_background(&self, image_url: &str) -> Result<ProcessedImage, ProcessingError>;
}
