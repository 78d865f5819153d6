//! # WorkflowState
//!
//! ワークフローインスタンスの状態遷移
//!
//! ```text
//! Idle -> Validating -> Uploading -> Processing -> Displayed
//!           |              |             |
//!           v              v             v
//!          Idle          Failed        Failed
//! ```

use std::fmt;

use super::image::ProcessedImage;

/// ワークフロー状態
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Validating,
    Uploading,
    Processing,
    Displayed(ProcessedImage),
    Failed(String),
}

impl WorkflowState {
    /// このワークフロー実行にとって終端状態かどうか
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Displayed(_) | WorkflowState::Failed(_))
    }

    /// アップロードまたは処理の実行中かどうか
    pub fn is_in_flight(&self) -> bool {
        matches!(self, WorkflowState::Uploading | WorkflowState::Processing)
    }

    /// 状態遷移が許可されているかどうか
    ///
    /// 終端状態とIdleからは新しい選択による `Validating` のみ許可する
    pub fn can_transition_to(&self, next: &WorkflowState) -> bool {
        use WorkflowState::*;

        match (self, next) {
            (Idle, Validating) => true,
            (Validating, Idle) | (Validating, Uploading) => true,
            (Uploading, Processing) | (Uploading, Failed(_)) => true,
            (Processing, Displayed(_)) | (Processing, Failed(_)) => true,
            (Displayed(_), Validating) | (Failed(_), Validating) => true,
            // 実行中の選択を置き換える場合
            (Uploading, Validating) | (Processing, Validating) => true,
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Validating => "validating",
            WorkflowState::Uploading => "uploading",
            WorkflowState::Processing => "processing",
            WorkflowState::Displayed(_) => "displayed",
            WorkflowState::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Displayed(image) => write!(f, "displayed ({})", image),
            WorkflowState::Failed(reason) => write!(f, "failed ({})", reason),
            other => f.write_str(other.name()),
        }
    }
}
