//! NextAuth Session Provider Implementation
//!
//! SessionProviderの実装（認証プロバイダーの `/api/auth/session` に資格情報を転送）

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{AUTHORIZATION, COOKIE};

use crate::adapter::config::Config;
use crate::adapter::http::build_http_client;
use crate::domain::entities::session::{Credentials, Session};
use crate::domain::repositories::session_provider::SessionProvider;

/// NextAuth互換のセッションプロバイダー
pub struct NextAuthSessionProvider {
    http_client: reqwest::Client,
    session_url: String,
}

impl NextAuthSessionProvider {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(config.request_timeout_secs)?,
            session_url: config.session_url(),
        })
    }

    /// セッションレスポンスを解釈する
    ///
    /// 未認証の場合プロバイダーは `{}` または `null` を返す
    fn parse_session(body: &str) -> Result<Option<Session>> {
        let body = body.trim();
        if body.is_empty() {
            return Ok(None);
        }

        let value: serde_json::Value =
            serde_json::from_str(body).context("Session response is not JSON")?;

        match value.get("user") {
            Some(user) if user.is_object() => {
                let session =
                    serde_json::from_value(value).context("Malformed session payload")?;
                Ok(Some(session))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl SessionProvider for NextAuthSessionProvider {
    async fn get_session(&self, credentials: &Credentials) -> Result<Option<Session>> {
        if credentials.is_empty() {
            return Ok(None);
        }

        let mut request = self.http_client.get(&self.session_url);
        if let Some(cookie) = &credentials.cookie {
            request = request.header(COOKIE, cookie);
        }
        if let Some(authorization) = &credentials.authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = request
            .send()
            .await
            .context("Failed to reach auth provider")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Auth provider returned {}", status);
        }

        let body = response
            .text()
            .await
            .context("Failed to read session response")?;
        debug!("Session lookup returned {} bytes", body.len());

        Self::parse_session(&body)
    }
}
