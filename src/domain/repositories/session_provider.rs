//! # Session Provider Trait
//!
//! 外部認証プロバイダーへのセッション問い合わせを抽象化

use anyhow::Result;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::session::{Credentials, Session};

/// セッションプロバイダー
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// リクエストの資格情報に紐づくセッションを取得する
    ///
    /// # Returns
    ///
    /// セッションが存在しない場合は `None`
    ///
    /// # Errors
    ///
    /// プロバイダーへの問い合わせに失敗した場合にエラーを返す
    async fn get_session(&self, credentials: &Credentials) -> Result<Option<Session>>;
}
