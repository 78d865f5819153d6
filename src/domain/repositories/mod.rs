//! # Domain Repositories
//!
//! 外部サービスへのケイパビリティ trait（インターフェース）定義
//!
//! ## 特徴
//!
//! - Domain層では実装を持たない（traitの定義のみ）
//! - Adapter層で具体的な実装を提供
//! - 依存性逆転の原則（DIP）を実現し、テストでは差し替え可能

pub mod inference_backend;
pub mod object_store;
pub mod processing_endpoint;
pub mod session_provider;
