//! Replicate API Models
//!
//! 予測APIのリクエスト/レスポンスとモデル識別子

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 背景除去モデル（バージョン固定）
pub const DEFAULT_MODEL: &str =
    "cjwbw/rembg:fb8af171cfa1616ddcf1242c093f9c46bcada5ad4cf6f2fbe8b81b330ec5c003";

/// `owner/name:version` 形式のモデル識別子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub owner: String,
    pub name: String,
    pub version: String,
}

impl FromStr for ModelRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((path, version)) = s.split_once(':') else {
            bail!("model identifier must be owner/name:version");
        };
        let Some((owner, name)) = path.split_once('/') else {
            bail!("model identifier must be owner/name:version");
        };
        if owner.is_empty() || name.is_empty() || version.is_empty() || name.contains('/') {
            bail!("model identifier must be owner/name:version");
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.name, self.version)
    }
}

/// 予測作成リクエスト
#[derive(Debug, Serialize)]
pub struct PredictionRequest<'a> {
    pub version: &'a str,
    pub input: PredictionInput<'a>,
}

#[derive(Debug, Serialize)]
pub struct PredictionInput<'a> {
    pub image: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Aborted,
}

impl PredictionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PredictionStatus::Starting | PredictionStatus::Processing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionStatus::Starting => "starting",
            PredictionStatus::Processing => "processing",
            PredictionStatus::Succeeded => "succeeded",
            PredictionStatus::Failed => "failed",
            PredictionStatus::Canceled => "canceled",
            PredictionStatus::Aborted => "aborted",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionUrls {
    pub get: Option<String>,
    pub cancel: Option<String>,
}

/// 予測レスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub urls: PredictionUrls,
}

impl Prediction {
    /// 出力から画像参照を取り出す（文字列、または配列の先頭の文字列）
    pub fn image_output(&self) -> Option<&str> {
        match self.output.as_ref()? {
            serde_json::Value::String(url) if !url.is_empty() => Some(url),
            serde_json::Value::Array(items) => items.iter().find_map(|item| item.as_str()),
            _ => None,
        }
    }

    pub fn error_message(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(message)) => message.clone(),
            Some(serde_json::Value::Null) | None => "no error detail".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_default_model() {
        let model: ModelRef = DEFAULT_MODEL.parse().unwrap();
        assert_eq!(model.owner, "cjwbw");
        assert_eq!(model.name, "rembg");
        assert_eq!(
            model.version,
            "fb8af171cfa1616ddcf1242c093f9c46bcada5ad4cf6f2fbe8b81b330ec5c003"
        );
        assert_eq!(model.to_string(), DEFAULT_MODEL);
    }

    #[test]
    fn test_parse_invalid_models() {
        assert!("rembg".parse::<ModelRef>().is_err());
        assert!("cjwbw/rembg".parse::<ModelRef>().is_err());
        assert!("cjwbw/rembg:".parse::<ModelRef>().is_err());
        assert!("/rembg:abc".parse::<ModelRef>().is_err());
        assert!("a/b/c:abc".parse::<ModelRef>().is_err());
    }

    #[test]
    fn test_request_body() {
        let request = PredictionRequest {
            version: "abc",
            input: PredictionInput {
                image: "https://bucket/x.jpg",
            },
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"version": "abc", "input": {"image": "https://bucket/x.jpg"}})
        );
    }

    #[test]
    fn test_prediction_output_string() {
        let prediction: Prediction = serde_json::from_value(json!({
            "id": "p1",
            "status": "succeeded",
            "output": "https://replicate.delivery/x-nobg.png",
            "error": null,
            "urls": {"get": "https://api.replicate.com/v1/predictions/p1"}
        }))
        .unwrap();

        assert!(prediction.status.is_terminal());
        assert_eq!(
            prediction.image_output(),
            Some("https://replicate.delivery/x-nobg.png")
        );
        assert_eq!(
            prediction.urls.get.as_deref(),
            Some("https://api.replicate.com/v1/predictions/p1")
        );
    }

    #[test]
    fn test_prediction_output_array_and_missing() {
        let array: Prediction = serde_json::from_value(json!({
            "id": "p2",
            "status": "succeeded",
            "output": ["https://replicate.delivery/a.png", "https://replicate.delivery/b.png"]
        }))
        .unwrap();
        assert_eq!(array.image_output(), Some("https://replicate.delivery/a.png"));

        let missing: Prediction =
            serde_json::from_value(json!({"id": "p3", "status": "processing"})).unwrap();
        assert!(!missing.status.is_terminal());
        assert_eq!(missing.image_output(), None);
        assert_eq!(missing.error_message(), "no error detail");
    }

    #[test]
    fn test_prediction_error_message() {
        let failed: Prediction = serde_json::from_value(json!({
            "id": "p4",
            "status": "failed",
            "error": "CUDA out of memory"
        }))
        .unwrap();
        assert_eq!(failed.error_message(), "CUDA out of memory");
        assert_eq!(failed.status.as_str(), "failed");
    }
}
