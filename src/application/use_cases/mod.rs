//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **UploadWorkflowController**: 選択検証 → アップロード → 処理 → 表示（クライアント側）
//! - **SessionGuard**: 処理エンドポイントの認可
//! - **RemoveBackgroundUseCase**: 認可済みリクエストを推論バックエンドへ転送（サーバー側）

pub mod authorize_session;
pub mod remove_background;
pub mod upload_workflow;
