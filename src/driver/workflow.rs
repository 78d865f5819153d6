//! Workflow Orchestration
//!
//! サブコマンドごとに依存性を組み立てて実行する

use anyhow::{bail, Context, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::adapter::config::Config;
use crate::adapter::replicate::client::ReplicateBackend;
use crate::adapter::repositories::http_object_store::HttpObjectStore;
use crate::adapter::repositories::http_processing_endpoint::HttpProcessingEndpoint;
use crate::adapter::repositories::next_auth_session_provider::NextAuthSessionProvider;
use crate::application::use_cases::upload_workflow::UploadWorkflowController;
use crate::domain::entities::upload_candidate::UploadCandidate;
use crate::domain::repositories::inference_backend::InferenceBackend;
use crate::domain::repositories::session_provider::SessionProvider;

use super::cli::{Args, Command};
use super::server::{build_router, AppState};

/// 選択されたファイルを読み込んで候補にする
///
/// 型とサイズの検証はコントローラーが行う
pub async fn read_selection(paths: &[PathBuf]) -> Result<Vec<UploadCandidate>> {
    let mut files = Vec::with_capacity(paths.len());

    for path in paths {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(UploadCandidate::from_file_name(file_name(path), content));
    }

    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

/// ProductAI Workflow
pub struct ProductAiWorkflow {
    config: Config,
}

impl ProductAiWorkflow {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Execute the selected subcommand
    pub async fn execute(&self, args: Args) -> Result<()> {
        match args.command {
            Command::Serve { bind } => self.serve(bind).await,
            Command::Process {
                files,
                session_token,
                endpoint,
            } => self.process(&files, session_token, endpoint).await,
        }
    }

    /// 処理エンドポイントを起動する
    async fn serve(&self, bind: Option<String>) -> Result<()> {
        // トークン未設定なら起動しない
        let api_token = Config::replicate_api_token()?;

        let session_provider: Arc<dyn SessionProvider> =
            Arc::new(NextAuthSessionProvider::new(&self.config)?);
        let backend = ReplicateBackend::new(&self.config, api_token)?;
        info!("Using model {}", backend.model());
        let backend: Arc<dyn InferenceBackend> = Arc::new(backend);

        let router = build_router(AppState::new(session_provider, backend));

        let addr = bind.unwrap_or_else(|| self.config.bind_addr.clone());
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        println!("✓ Listening on {}", listener.local_addr()?);
        println!("  Auth provider: {}", self.config.session_url());

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        println!("✓ Server stopped");
        Ok(())
    }

    /// 写真をアップロードして背景を除去する
    async fn process(
        &self,
        paths: &[PathBuf],
        session_token: Option<String>,
        endpoint: Option<String>,
    ) -> Result<()> {
        let mut config = self.config.clone();
        if let Some(endpoint) = endpoint {
            config.endpoint_url = endpoint;
        }

        let object_store = Arc::new(HttpObjectStore::new(&config)?);
        let processing_endpoint = Arc::new(HttpProcessingEndpoint::new(&config, session_token)?);
        let controller = Arc::new(UploadWorkflowController::new(
            object_store,
            processing_endpoint,
        ));

        println!("✓ Accepting {}", controller.constraints().accept_list());

        let files = read_selection(paths).await?;
        let mut states = controller.subscribe();

        let run = match controller.accept_selection(files) {
            Ok(run) => run,
            Err(rejections) => {
                println!("✗ Selection rejected:");
                for message in rejections.messages() {
                    println!("  - {}", message);
                }
                bail!("Selection rejected: {}", rejections);
            }
        };

        let wait = run.wait();
        tokio::pin!(wait);

        let result = loop {
            tokio::select! {
                result = &mut wait => break result,
                Ok(()) = states.changed() => {
                    let state = states.borrow_and_update().clone();
                    if !state.is_terminal() {
                        println!("  … {}", state);
                    }
                }
            }
        };

        let image = result.context("Background removal failed")?;
        println!("✓ Background removed: {}", image);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_selection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shoe.JPG");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&[0xFF, 0xD8, 0xFF])
            .unwrap();

        let files = read_selection(&[path]).await.unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), "shoe.JPG");
        assert_eq!(files[0].content_type(), "image/jpeg");
        assert_eq!(files[0].size(), 3);
    }

    #[tokio::test]
    async fn test_read_selection_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_selection(&[dir.path().join("missing.png")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing.png"));
    }

    #[tokio::test]
    async fn test_process_rejects_before_upload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        // 到達不能なストレージ: 検証で拒否されるためアップロードは行われない
        let config = Config {
            storage_upload_url: "http://127.0.0.1:1".to_string(),
            ..Config::default()
        };
        let workflow = ProductAiWorkflow::new(config);
        let args = Args {
            config: "./productai.json".to_string(),
            command: Command::Process {
                files: vec![path],
                session_token: None,
                endpoint: None,
            },
        };

        let err = workflow.execute(args).await.unwrap_err();
        assert!(err.to_string().starts_with("Selection rejected"));
    }

    #[tokio::test]
    async fn test_process_requires_storage() {
        let workflow = ProductAiWorkflow::new(Config::default());
        let args = Args {
            config: "./productai.json".to_string(),
            command: Command::Process {
                files: vec![],
                session_token: None,
                endpoint: None,
            },
        };

        let err = workflow.execute(args).await.unwrap_err();
        assert!(err.to_string().contains("storage_upload_url"));
    }
}
