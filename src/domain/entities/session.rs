//! # Session Entity
//!
//! 外部認証プロバイダーが発行するセッション

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// 認証済みユーザー
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

/// セッション
///
/// Session Guard は存在のみを確認し、中身は解釈しない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    /// 解釈できない値は `None` として扱う
    #[serde(default, deserialize_with = "lenient_expires")]
    pub expires: Option<DateTime<Utc>>,
}

fn lenient_expires<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

impl Session {
    pub fn new(user: SessionUser) -> Self {
        Self {
            user,
            expires: None,
        }
    }

    /// ログ出力用の識別子
    pub fn user_label(&self) -> &str {
        self.user
            .email
            .as_deref()
            .or(self.user.name.as_deref())
            .unwrap_or("anonymous")
    }
}

/// リクエストから取り出した資格情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// `Cookie` ヘッダー
    pub cookie: Option<String>,
    /// `Authorization` ヘッダー
    pub authorization: Option<String>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.cookie.is_none() && self.authorization.is_none()
    }
}
