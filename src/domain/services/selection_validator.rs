//! # Selection Validator Service
//!
//! ドロップ/選択されたファイルの受け入れルール

use crate::domain::entities::upload_candidate::UploadCandidate;
use crate::domain::entities::validation::{Rejection, SelectionConstraints, ValidationResult};

/// 選択検証サービス
pub struct SelectionValidator;

impl SelectionValidator {
    /// 1ファイル分のルール違反を返す
    pub fn file_rejections(
        file: &UploadCandidate,
        constraints: &SelectionConstraints,
    ) -> Vec<Rejection> {
        let mut rejections = Vec::new();

        if !constraints.accepts_mime(file.content_type()) {
            rejections.push(Rejection::invalid_type(constraints));
        }
        if file.size() > constraints.max_size {
            rejections.push(Rejection::too_large(constraints.max_size));
        }

        rejections
    }

    /// 選択全体を検証する
    ///
    /// 最大ファイル数を超える場合は全ファイルを `too-many-files` として拒否し、
    /// 各ファイル固有の違反もあわせて報告する（コードごとに1件）
    ///
    /// # Returns
    ///
    /// 受け入れ可能な場合は唯一の候補、そうでなければ検証結果
    pub fn validate(
        files: Vec<UploadCandidate>,
        constraints: &SelectionConstraints,
    ) -> Result<UploadCandidate, ValidationResult> {
        let mut result = ValidationResult::new();

        if files.is_empty() {
            result.push(Rejection::no_files());
            return Err(result);
        }

        let too_many = files.len() > constraints.max_files;

        for file in &files {
            if too_many {
                result.push(Rejection::too_many_files());
            }
            for rejection in Self::file_rejections(file, constraints) {
                result.push(rejection);
            }
        }

        if !result.is_empty() {
            return Err(result);
        }

        // max_files >= 1 かつ違反なしなので先頭が唯一の候補
        files.into_iter().next().ok_or_else(|| {
            let mut result = ValidationResult::new();
            result.push(Rejection::no_files());
            result
        })
    }
}
