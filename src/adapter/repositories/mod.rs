//! Repository Implementations
//!
//! Domain層のケイパビリティ trait の実装

pub mod http_object_store;
pub mod http_processing_endpoint;
pub mod next_auth_session_provider;
