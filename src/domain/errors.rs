//! # Domain Errors
//!
//! ワークフローのエラー分類
//!
//! - **StorageError**: ストレージへのアップロード失敗
//! - **ProcessingError**: 背景除去の失敗（通信、不正なレスポンス、非成功）
//! - **Unauthorized**: セッションなし
//! - **WorkflowError**: ワークフロー全体の失敗

use thiserror::Error;

/// ストレージエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Storage returned no URL")]
    MissingUrl,
}

/// 処理エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Processing endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Processing was not successful: {0}")]
    Rejected(String),

    #[error("Prediction {id} ended with status {status}: {message}")]
    PredictionFailed {
        id: String,
        status: String,
        message: String,
    },

    #[error("Prediction {0} timed out")]
    Timeout(String),
}

/// 認証エラー（HTTP 401 相当）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Not authenticated")]
pub struct Unauthorized;

/// ワークフローエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error("Workflow was superseded by a newer selection")]
    Superseded,
}
