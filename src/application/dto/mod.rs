//! # Data Transfer Objects
//!
//! - **ProcessingResponse**: 処理エンドポイントのJSONレスポンス

pub mod processing_response;
