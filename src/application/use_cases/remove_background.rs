//! # Remove Background Use Case
//!
//! 処理エンドポイントのビジネスフロー（認可 → 入力検証 → 推論バックエンド）

use std::sync::Arc;

use log::{error, info, warn};
use thiserror::Error;
use url::Url;

use crate::application::use_cases::authorize_session::SessionGuard;
use crate::domain::entities::image::ProcessedImage;
use crate::domain::entities::session::Credentials;
use crate::domain::errors::{ProcessingError, Unauthorized};
use crate::domain::repositories::inference_backend::InferenceBackend;
use crate::domain::repositories::session_provider::SessionProvider;

/// 背景除去ユースケースのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoveBackgroundError {
    #[error(transparent)]
    Unauthorized(#[from] Unauthorized),

    #[error("Invalid image URL")]
    InvalidImageUrl,

    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

/// リクエストボディから画像URLを取り出す
///
/// 前後の空白を除き、ホストを持つ http(s) URL のみ受け付ける
pub fn parse_image_url(body: &str) -> Option<&str> {
    let raw = body.trim();
    if raw.contains(char::is_whitespace) {
        return None;
    }

    let url = Url::parse(raw).ok()?;
    match (url.scheme(), url.host_str()) {
        ("http" | "https", Some(host)) if !host.is_empty() => Some(raw),
        _ => None,
    }
}

/// 背景除去ユースケース
///
/// セッションがない場合は推論バックエンドを呼び出さずに拒否する
pub struct RemoveBackgroundUseCase<S, B>
where
    S: SessionProvider + ?Sized,
    B: InferenceBackend + ?Sized,
{
    guard: SessionGuard<S>,
    backend: Arc<B>,
}

impl<S, B> RemoveBackgroundUseCase<S, B>
where
    S: SessionProvider + ?Sized,
    B: InferenceBackend + ?Sized,
{
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `session_provider` - セッションプロバイダー
    /// * `backend` - 推論バックエンド
    pub fn new(session_provider: Arc<S>, backend: Arc<B>) -> Self {
        Self {
            guard: SessionGuard::new(session_provider),
            backend,
        }
    }

    /// リクエストを処理する
    ///
    /// # Arguments
    ///
    /// * `credentials` - リクエストの資格情報
    /// * `body` - 生のリクエストボディ（UTF-8のストレージURL）
    ///
    /// # Errors
    ///
    /// 未認証、不正なURL、推論の失敗でエラーを返す
    pub async fn execute(
        &self,
        credentials: &Credentials,
        body: &[u8],
    ) -> Result<ProcessedImage, RemoveBackgroundError> {
        let session = self.guard.authorize(credentials).await.map_err(|e| {
            warn!("Rejected unauthenticated remove-bg request");
            e
        })?;

        // ボディの解釈は認可の後
        let image_url = std::str::from_utf8(body)
            .ok()
            .and_then(parse_image_url)
            .ok_or(RemoveBackgroundError::InvalidImageUrl)?;

        info!(
            "Removing background for {} (user: {})",
            image_url,
            session.user_label()
        );

        match self.backend.remove_background(image_url).await {
            Ok(image) => {
                info!("Background removed: {}", image);
                Ok(image)
            }
            Err(e) => {
                error!("Background removal failed for {}: {}", image_url, e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::session::{Session, SessionUser};
    use crate::domain::repositories::inference_backend::MockInferenceBackend;
    use crate::domain::repositories::session_provider::MockSessionProvider;
    use mockall::predicate::function;

    fn credentials() -> Credentials {
        Credentials {
            cookie: Some("next-auth.session-token=abc".to_string()),
            authorization: None,
        }
    }

    fn signed_in() -> MockSessionProvider {
        let mut provider = MockSessionProvider::new();
        provider
            .expect_get_session()
            .returning(|_| Ok(Some(Session::new(SessionUser::default()))));
        provider
    }

    #[test]
    fn test_parse_image_url() {
        assert_eq!(
            parse_image_url("https://bucket/x.jpg"),
            Some("https://bucket/x.jpg")
        );
        assert_eq!(
            parse_image_url("  http://bucket/x.jpg\n"),
            Some("http://bucket/x.jpg")
        );
        assert_eq!(parse_image_url(""), None);
        assert_eq!(parse_image_url("https://"), None);
        assert_eq!(parse_image_url("ftp://bucket/x.jpg"), None);
        assert_eq!(parse_image_url("https://bucket/x y.jpg"), None);
    }

    #[test]
    fn test_parse_image_url_rejects_malformed() {
        assert_eq!(parse_image_url("https://[::1"), None);
        assert_eq!(parse_image_url("https://%%%"), None);
        assert_eq!(parse_image_url("http://a\0b"), None);
        assert_eq!(parse_image_url("https://:::/x"), None);
        assert_eq!(parse_image_url("file:///etc/passwd"), None);
        assert_eq!(parse_image_url("mailto:someone@example.com"), None);
        assert_eq!(
            parse_image_url("https://bucket.example.com:9000/uploads/x.png?v=1"),
            Some("https://bucket.example.com:9000/uploads/x.png?v=1")
        );
    }

    #[tokio::test]
    async fn test_execute_success() {
        let mut backend = MockInferenceBackend::new();
        backend
            .expect_remove_background()
            .with(function(|url: &str| url == "https://bucket/x.jpg"))
            .times(1)
            .returning(|_| Ok(ProcessedImage::new("https://bucket/x-nobg.png")));

        let use_case = RemoveBackgroundUseCase::new(Arc::new(signed_in()), Arc::new(backend));
        let image = use_case
            .execute(&credentials(), b"https://bucket/x.jpg")
            .await
            .unwrap();

        assert_eq!(image.url(), "https://bucket/x-nobg.png");
    }

    #[tokio::test]
    async fn test_execute_unauthenticated_never_calls_backend() {
        let mut provider = MockSessionProvider::new();
        provider.expect_get_session().returning(|_| Ok(None));
        let mut backend = MockInferenceBackend::new();
        backend.expect_remove_background().times(0);

        let use_case = RemoveBackgroundUseCase::new(Arc::new(provider), Arc::new(backend));
        let result = use_case
            .execute(&credentials(), b"https://bucket/x.jpg")
            .await;

        assert_eq!(result, Err(RemoveBackgroundError::Unauthorized(Unauthorized)));
    }

    #[tokio::test]
    async fn test_execute_invalid_url() {
        let mut backend = MockInferenceBackend::new();
        backend.expect_remove_background().times(0);

        let use_case = RemoveBackgroundUseCase::new(Arc::new(signed_in()), Arc::new(backend));
        let result = use_case.execute(&credentials(), b"not a url").await;

        assert_eq!(result, Err(RemoveBackgroundError::InvalidImageUrl));
    }

    #[tokio::test]
    async fn test_execute_non_utf8_body_checks_session_first() {
        let mut provider = MockSessionProvider::new();
        provider.expect_get_session().times(1).returning(|_| Ok(None));
        let mut backend = MockInferenceBackend::new();
        backend.expect_remove_background().times(0);

        let use_case = RemoveBackgroundUseCase::new(Arc::new(provider), Arc::new(backend));
        let result = use_case.execute(&credentials(), &[0xff, 0xfe]).await;

        assert_eq!(result, Err(RemoveBackgroundError::Unauthorized(Unauthorized)));
    }

    #[tokio::test]
    async fn test_execute_non_utf8_body_is_invalid_url() {
        let mut backend = MockInferenceBackend::new();
        backend.expect_remove_background().times(0);

        let use_case = RemoveBackgroundUseCase::new(Arc::new(signed_in()), Arc::new(backend));
        let result = use_case.execute(&credentials(), &[0xff, 0xfe]).await;

        assert_eq!(result, Err(RemoveBackgroundError::InvalidImageUrl));
    }

    #[tokio::test]
    async fn test_execute_backend_failure_is_surfaced() {
        let mut backend = MockInferenceBackend::new();
        backend.expect_remove_background().returning(|_| {
            Err(ProcessingError::PredictionFailed {
                id: "p1".to_string(),
                status: "failed".to_string(),
                message: "CUDA out of memory".to_string(),
            })
        });

        let use_case = RemoveBackgroundUseCase::new(Arc::new(signed_in()), Arc::new(backend));
        let result = use_case
            .execute(&credentials(), b"https://bucket/x.jpg")
            .await;

        assert!(matches!(
            result,
            Err(RemoveBackgroundError::Processing(
                ProcessingError::PredictionFailed { .. }
            ))
        ));
    }
}
