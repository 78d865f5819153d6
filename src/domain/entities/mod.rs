//! # Domain Entities
//!
//! ビジネスエンティティとバリューオブジェクトを定義するモジュール
//!
//! ## エンティティ
//!
//! - **UploadCandidate**: ユーザーが選択した画像ファイル
//! - **ValidationResult**: 選択の拒否理由
//! - **UploadedAsset / ProcessedImage**: ストレージ上の画像と処理結果
//! - **Session**: 認証済みセッション
//! - **WorkflowState**: ワークフローの状態機械

pub mod image;
pub mod session;
pub mod upload_candidate;
pub mod validation;
pub mod workflow_state;
