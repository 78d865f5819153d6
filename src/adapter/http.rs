//! HTTP Client Helpers
//!
//! 外部サービス呼び出しで共有するHTTPクライアントとエラー整形

use anyhow::{Context, Result};
use std::time::Duration;

pub const USER_AGENT: &str = "productai/1.0.0";

/// Build a reqwest client with the shared user agent and timeout
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

/// Convert error chain to string including all causes
pub fn error_chain_to_string(e: &(dyn std::error::Error + 'static)) -> String {
    let mut messages = vec![e.to_string()];
    let mut source = e.source();
    while let Some(cause) = source {
        messages.push(cause.to_string());
        source = cause.source();
    }
    messages.join(" | ")
}
