//! # Image Value Objects
//!
//! アップロード済みアセットと処理済み画像

use std::fmt;

use serde::{Deserialize, Serialize};

/// オブジェクトストレージにアップロードされたアセット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// ストレージ上のキー
    pub key: String,
    /// 公開URL
    pub url: String,
}

impl UploadedAsset {
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
        }
    }
}

/// 背景除去済み画像
///
/// 推論バックエンドが返した画像参照（URL）をそのまま保持する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessedImage {
    url: String,
}

impl ProcessedImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn into_url(self) -> String {
        self.url
    }
}

impl fmt::Display for ProcessedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
