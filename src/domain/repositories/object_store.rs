//! # Object Store Trait
//!
//! オブジェクトストレージへのアップロードを抽象化

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::image::UploadedAsset;
use crate::domain::entities::upload_candidate::UploadCandidate;
use crate::domain::errors::StorageError;

/// オブジェクトストレージ
///
/// バイナリファイルを受け取り、公開URLを返す外部サービス
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 候補ファイルをアップロードする
    ///
    /// # Arguments
    ///
    /// * `candidate` - アップロードする候補
    ///
    /// # Returns
    ///
    /// 公開URLを含むアップロード済みアセット
    ///
    /// # Errors
    ///
    /// アップロードに失敗した場合に `StorageError` を返す
    async fn upload(&self, candidate: &UploadCandidate) -> Result<UploadedAsset, StorageError>;
}
