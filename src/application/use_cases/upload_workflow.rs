//! # Upload Workflow Use Case
//!
//! Upload Workflow Controller: 選択検証 → ストレージアップロード → 背景除去 → 表示
//!
//! コントローラーは候補を1つだけ保持する（後勝ち）。新しい選択を受け付けると
//! 実行中のワークフローはキャンセルされ、古い結果が新しい状態を上書きすることはない。
//! 状態は `watch` チャネルでプレゼンテーション層に公開する。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::entities::image::ProcessedImage;
use crate::domain::entities::upload_candidate::UploadCandidate;
use crate::domain::entities::validation::{SelectionConstraints, ValidationResult};
use crate::domain::entities::workflow_state::WorkflowState;
use crate::domain::errors::{StorageError, WorkflowError};
use crate::domain::repositories::object_store::ObjectStore;
use crate::domain::repositories::processing_endpoint::ProcessingEndpoint;
use crate::domain::services::selection_validator::SelectionValidator;

/// 単一スロットの選択状態
struct Slot {
    candidate: Option<UploadCandidate>,
    generation: u64,
    cancel: CancellationToken,
}

impl Slot {
    /// 実行中のワークフローをキャンセルして世代を進める
    fn supersede(&mut self) {
        self.cancel.cancel();
        self.generation += 1;
        self.cancel = CancellationToken::new();
    }
}

/// 受け付けた選択に対して起動されたワークフロー実行
#[derive(Debug)]
pub struct WorkflowRun {
    generation: u64,
    handle: JoinHandle<Result<ProcessedImage, WorkflowError>>,
}

impl WorkflowRun {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// ワークフローの完了を待つ
    pub async fn wait(self) -> Result<ProcessedImage, WorkflowError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(WorkflowError::Superseded),
        }
    }
}

/// アップロードワークフローコントローラー
pub struct UploadWorkflowController<O, P>
where
    O: ObjectStore + ?Sized,
    P: ProcessingEndpoint + ?Sized,
{
    constraints: SelectionConstraints,
    object_store: Arc<O>,
    endpoint: Arc<P>,
    slot: Mutex<Slot>,
    state_tx: watch::Sender<WorkflowState>,
}

impl<O, P> UploadWorkflowController<O, P>
where
    O: ObjectStore + ?Sized + 'static,
    P: ProcessingEndpoint + ?Sized + 'static,
{
    /// デフォルトの選択制約でコントローラーを作成
    ///
    /// # Arguments
    ///
    /// * `object_store` - オブジェクトストレージ
    /// * `endpoint` - 処理エンドポイント
    pub fn new(object_store: Arc<O>, endpoint: Arc<P>) -> Self {
        Self::with_constraints(SelectionConstraints::default(), object_store, endpoint)
    }

    pub fn with_constraints(
        constraints: SelectionConstraints,
        object_store: Arc<O>,
        endpoint: Arc<P>,
    ) -> Self {
        let (state_tx, _) = watch::channel(WorkflowState::Idle);

        Self {
            constraints,
            object_store,
            endpoint,
            slot: Mutex::new(Slot {
                candidate: None,
                generation: 0,
                cancel: CancellationToken::new(),
            }),
            state_tx,
        }
    }

    pub fn constraints(&self) -> &SelectionConstraints {
        &self.constraints
    }

    /// 状態の変化を購読する
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state_tx.subscribe()
    }

    /// 現在の状態
    pub fn state(&self) -> WorkflowState {
        self.state_tx.borrow().clone()
    }

    /// 現在保持している候補
    pub fn candidate(&self) -> Option<UploadCandidate> {
        self.lock_slot().candidate.clone()
    }

    /// 選択を受け付ける
    ///
    /// 受け入れ可能な場合は候補を置き換え、ワークフローを起動して返す。
    /// 拒否した場合はアップロードを行わず、保持中の候補と実行中のワークフローにも触れない
    ///
    /// # Arguments
    ///
    /// * `files` - 選択されたファイル
    ///
    /// # Errors
    ///
    /// 選択がルールに違反する場合に `ValidationResult` を返す
    pub fn accept_selection(
        self: &Arc<Self>,
        files: Vec<UploadCandidate>,
    ) -> Result<WorkflowRun, ValidationResult> {
        let file_count = files.len();
        let validation = SelectionValidator::validate(files, &self.constraints);

        let mut slot = self.lock_slot();
        match validation {
            Err(result) => {
                // 保持中の候補と実行中のワークフローはそのまま
                let in_flight = self.state_tx.borrow().is_in_flight();
                if !in_flight {
                    self.publish(WorkflowState::Validating);
                    self.publish(WorkflowState::Idle);
                }
                drop(slot);

                warn!("Rejected selection of {} file(s): {}", file_count, result);
                Err(result)
            }
            Ok(candidate) => {
                let (generation, token) = self.begin_run(&mut slot, candidate.clone());
                drop(slot);

                info!(
                    "Accepted {} ({}, {} bytes) as run #{}",
                    candidate.file_name(),
                    candidate.content_type(),
                    candidate.size(),
                    generation
                );

                let controller = Arc::clone(self);
                let handle = tokio::spawn(async move {
                    controller.drive(candidate, generation, token).await
                });

                Ok(WorkflowRun { generation, handle })
            }
        }
    }

    /// 検証済みの候補でワークフローを実行する
    ///
    /// 候補をスロットに登録し、アップロードと処理を順に行う
    ///
    /// # Errors
    ///
    /// - `WorkflowError::Storage`: アップロードに失敗、またはURLが返されない
    /// - `WorkflowError::Processing`: 処理エンドポイントの失敗
    /// - `WorkflowError::Superseded`: 新しい選択に置き換えられた
    pub async fn run_workflow(
        &self,
        candidate: UploadCandidate,
    ) -> Result<ProcessedImage, WorkflowError> {
        let (generation, token) = {
            let mut slot = self.lock_slot();
            self.begin_run(&mut slot, candidate.clone())
        };
        self.drive(candidate, generation, token).await
    }

    fn begin_run(&self, slot: &mut Slot, candidate: UploadCandidate) -> (u64, CancellationToken) {
        slot.supersede();
        slot.candidate = Some(candidate);
        self.publish(WorkflowState::Validating);
        self.publish(WorkflowState::Uploading);
        (slot.generation, slot.cancel.clone())
    }

    async fn drive(
        &self,
        candidate: UploadCandidate,
        generation: u64,
        token: CancellationToken,
    ) -> Result<ProcessedImage, WorkflowError> {
        let uploaded = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(WorkflowError::Superseded),
            result = self.object_store.upload(&candidate) => result,
        };

        let asset = match uploaded {
            Ok(asset) if asset.url.trim().is_empty() => {
                return Err(self.fail(generation, StorageError::MissingUrl.into()));
            }
            Ok(asset) => asset,
            Err(e) => return Err(self.fail(generation, e.into())),
        };
        info!("Uploaded {} to {}", candidate.file_name(), asset.url);

        if !self.advance(generation, WorkflowState::Processing) {
            return Err(WorkflowError::Superseded);
        }

        let processed = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(WorkflowError::Superseded),
            result = self.endpoint.process(&asset.url) => result,
        };

        match processed {
            Ok(image) => self.complete(generation, image),
            Err(e) => Err(self.fail(generation, e.into())),
        }
    }

    /// 現在の世代であれば状態を進める
    fn advance(&self, generation: u64, next: WorkflowState) -> bool {
        let slot = self.lock_slot();
        if slot.generation != generation {
            debug!("Run #{} is stale, not publishing {}", generation, next);
            return false;
        }
        self.publish(next);
        true
    }

    fn fail(&self, generation: u64, err: WorkflowError) -> WorkflowError {
        let slot = self.lock_slot();
        if slot.generation != generation {
            debug!("Run #{} failed after being superseded: {}", generation, err);
            return WorkflowError::Superseded;
        }

        error!("Run #{} failed: {}", generation, err);
        self.publish(WorkflowState::Failed(err.to_string()));
        err
    }

    fn complete(
        &self,
        generation: u64,
        image: ProcessedImage,
    ) -> Result<ProcessedImage, WorkflowError> {
        let mut slot = self.lock_slot();
        if slot.generation != generation {
            return Err(WorkflowError::Superseded);
        }

        slot.candidate = None;
        self.publish(WorkflowState::Displayed(image.clone()));
        info!("Run #{} displayed {}", generation, image);
        Ok(image)
    }

    /// 許可された遷移のみ公開する
    fn publish(&self, next: WorkflowState) -> bool {
        self.state_tx.send_if_modified(|current| {
            if current.can_transition_to(&next) {
                debug!("Workflow state: {} -> {}", current, next);
                *current = next;
                true
            } else {
                warn!("Ignoring invalid transition {} -> {}", current, next);
                false
            }
        })
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
