//! Replicate Adapter Modules
//!
//! 背景除去モデルを提供する推論プロバイダーとの統合

pub mod client;
pub mod models;
