//! # Authorize Session Use Case
//!
//! Session Guard: 認証済みセッションのないリクエストを拒否する

use std::sync::Arc;

use log::{debug, warn};

use crate::domain::entities::session::{Credentials, Session};
use crate::domain::errors::Unauthorized;
use crate::domain::repositories::session_provider::SessionProvider;

/// セッションガード
///
/// 外部認証プロバイダーにセッションを問い合わせ、存在しなければ `Unauthorized` を返す
pub struct SessionGuard<S: SessionProvider + ?Sized> {
    session_provider: Arc<S>,
}

impl<S: SessionProvider + ?Sized> SessionGuard<S> {
    /// 新しいガードを作成
    ///
    /// # Arguments
    ///
    /// * `session_provider` - セッションプロバイダー
    pub fn new(session_provider: Arc<S>) -> Self {
        Self { session_provider }
    }

    /// リクエストを認可する
    ///
    /// 資格情報がない場合はプロバイダーに問い合わせずに拒否する。
    /// プロバイダーの障害も `Unauthorized` として扱う
    pub async fn authorize(&self, credentials: &Credentials) -> Result<Session, Unauthorized> {
        if credentials.is_empty() {
            debug!("Request carries no credentials");
            return Err(Unauthorized);
        }

        match self.session_provider.get_session(credentials).await {
            Ok(Some(session)) => {
                debug!("Authorized session for {}", session.user_label());
                Ok(session)
            }
            Ok(None) => Err(Unauthorized),
            Err(e) => {
                warn!("Session lookup failed: {:#}", e);
                Err(Unauthorized)
            }
        }
    }
}
