//! Configuration
//!
//! JSON設定ファイルと環境変数からの設定読み込み

use anyhow::{bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::adapter::replicate::models::{ModelRef, DEFAULT_MODEL};

/// 推論プロバイダーのAPIトークンを読む環境変数
pub const API_TOKEN_ENV: &str = "REPLICATE_API_TOKEN";

/// Expands tilde in path and returns the full path
pub fn expand_path(path: &str) -> String {
    shellexpand::tilde(path).to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    // Processing endpoint (server)
    pub bind_addr: String,

    // Authentication provider
    pub auth_base_url: String,

    // Inference provider
    pub replicate_api_base: String,
    pub model: String,
    pub poll_interval_ms: u64,
    pub prediction_timeout_secs: u64,

    // Object storage (client)
    pub storage_upload_url: String,
    pub storage_public_url: Option<String>,

    // Processing endpoint (client)
    pub endpoint_url: String,

    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            auth_base_url: "http://localhost:3000".to_string(),
            replicate_api_base: "https://api.replicate.com/v1".to_string(),
            model: DEFAULT_MODEL.to_string(),
            poll_interval_ms: 500,
            prediction_timeout_secs: 120,
            storage_upload_url: String::new(),
            storage_public_url: None,
            endpoint_url: "http://localhost:3000/api/remove-bg".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let expanded = expand_path(path);
        let content = fs::read_to_string(&expanded)
            .with_context(|| format!("Failed to read config file: {}", expanded))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", expanded))?;
        config.validate()?;
        Ok(config)
    }

    /// 設定ファイルがなければデフォルト値を使う
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(&expand_path(path)).exists() {
            info!("No config file at {}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than 0");
        }
        if self.prediction_timeout_secs == 0 {
            bail!("prediction_timeout_secs must be greater than 0");
        }
        self.model_ref()?;
        Ok(())
    }

    pub fn model_ref(&self) -> Result<ModelRef> {
        self.model
            .parse()
            .with_context(|| format!("Invalid model identifier: {}", self.model))
    }

    /// アップロード先と異なる場合の公開URLベース
    pub fn public_base_url(&self) -> &str {
        self.storage_public_url
            .as_deref()
            .unwrap_or(&self.storage_upload_url)
    }

    /// 認証プロバイダーのセッションエンドポイント
    pub fn session_url(&self) -> String {
        format!("{}/api/auth/session", self.auth_base_url.trim_end_matches('/'))
    }

    /// 推論プロバイダーのAPIトークン
    ///
    /// 未設定の場合は起動を中断できるようエラーを返す
    pub fn replicate_api_token() -> Result<String> {
        Self::api_token_from(std::env::var(API_TOKEN_ENV).ok())
    }

    fn api_token_from(value: Option<String>) -> Result<String> {
        match value.map(|v| v.trim().to_string()) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => bail!("{} is not set", API_TOKEN_ENV),
        }
    }
}
