//! Adapter Layer
//!
//! 外部システム（オブジェクトストレージ、認証プロバイダー、推論API）との統合

pub mod config;
pub mod http;
pub mod replicate;
pub mod repositories;
