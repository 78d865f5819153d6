//! # Selection Validation Value Objects
//!
//! 選択制約と検証結果のバリューオブジェクト

use std::fmt;

use serde::Serialize;

use super::upload_candidate::{MIME_JPEG, MIME_PNG};

/// 最大ファイルサイズ（バイト）
pub const DEFAULT_MAX_SIZE: u64 = 10_000_000;
/// 一度に選択できる最大ファイル数
pub const DEFAULT_MAX_FILES: usize = 1;

/// 受け付けるMIMEタイプとその拡張子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedType {
    pub mime_type: String,
    pub extensions: Vec<String>,
}

impl AcceptedType {
    pub fn new(mime_type: &str, extensions: &[&str]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

/// 選択制約
///
/// ドロップ/ファイル選択時に適用される受け入れルール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionConstraints {
    pub accepted_types: Vec<AcceptedType>,
    pub max_files: usize,
    pub max_size: u64,
}

impl SelectionConstraints {
    /// MIMEタイプが受け入れ対象かどうか
    pub fn accepts_mime(&self, mime_type: &str) -> bool {
        self.accepted_types
            .iter()
            .any(|accepted| accepted.mime_type.eq_ignore_ascii_case(mime_type))
    }

    /// `image/png, .png, image/jpeg, .jpeg, .jpg` 形式の受け入れリスト
    pub fn accept_list(&self) -> String {
        self.accepted_types
            .iter()
            .flat_map(|accepted| {
                std::iter::once(accepted.mime_type.clone()).chain(accepted.extensions.iter().cloned())
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for SelectionConstraints {
    fn default() -> Self {
        Self {
            accepted_types: vec![
                AcceptedType::new(MIME_PNG, &[".png"]),
                AcceptedType::new(MIME_JPEG, &[".jpeg", ".jpg"]),
            ],
            max_files: DEFAULT_MAX_FILES,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

/// 拒否理由コード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RejectionCode {
    #[serde(rename = "file-invalid-type")]
    FileInvalidType,
    #[serde(rename = "file-too-large")]
    FileTooLarge,
    #[serde(rename = "too-many-files")]
    TooManyFiles,
    #[serde(rename = "no-files")]
    NoFiles,
}

impl RejectionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionCode::FileInvalidType => "file-invalid-type",
            RejectionCode::FileTooLarge => "file-too-large",
            RejectionCode::TooManyFiles => "too-many-files",
            RejectionCode::NoFiles => "no-files",
        }
    }
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 拒否理由（コードとユーザー向けメッセージ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub code: RejectionCode,
    pub message: String,
}

impl Rejection {
    pub fn invalid_type(constraints: &SelectionConstraints) -> Self {
        let accept = constraints.accept_list();
        let message = if constraints.accepted_types.len() == 1
            && constraints.accepted_types[0].extensions.is_empty()
        {
            format!("File type must be {}", accept)
        } else {
            format!("File type must be one of {}", accept)
        };
        Self {
            code: RejectionCode::FileInvalidType,
            message,
        }
    }

    pub fn too_large(max_size: u64) -> Self {
        let unit = if max_size == 1 { "byte" } else { "bytes" };
        Self {
            code: RejectionCode::FileTooLarge,
            message: format!("File is larger than {} {}", max_size, unit),
        }
    }

    pub fn too_many_files() -> Self {
        Self {
            code: RejectionCode::TooManyFiles,
            message: "Too many files".to_string(),
        }
    }

    pub fn no_files() -> Self {
        Self {
            code: RejectionCode::NoFiles,
            message: "No file selected".to_string(),
        }
    }
}

/// 検証結果
///
/// 拒否理由をコード単位で重複排除して保持する。
/// 同じコードが複数回報告された場合は最初のメッセージを残す
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    rejections: Vec<Rejection>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 拒否理由を追加（既存コードは無視）
    pub fn push(&mut self, rejection: Rejection) {
        if !self.contains(rejection.code) {
            self.rejections.push(rejection);
        }
    }

    pub fn contains(&self, code: RejectionCode) -> bool {
        self.rejections.iter().any(|r| r.code == code)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rejections.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rejections.len()
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn codes(&self) -> Vec<RejectionCode> {
        self.rejections.iter().map(|r| r.code).collect()
    }

    /// ユーザーに表示するメッセージ（コードごとに1件）
    pub fn messages(&self) -> Vec<&str> {
        self.rejections.iter().map(|r| r.message.as_str()).collect()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl std::error::Error for ValidationResult {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constraints() {
        let constraints = SelectionConstraints::default();
        assert_eq!(constraints.max_files, 1);
        assert_eq!(constraints.max_size, 10_000_000);
        assert!(constraints.accepts_mime("image/png"));
        assert!(constraints.accepts_mime("image/jpeg"));
        assert!(constraints.accepts_mime("IMAGE/PNG"));
        assert!(!constraints.accepts_mime("image/gif"));
    }

    #[test]
    fn test_rejection_messages() {
        let constraints = SelectionConstraints::default();
        assert_eq!(
            Rejection::invalid_type(&constraints).message,
            "File type must be one of image/png, .png, image/jpeg, .jpeg, .jpg"
        );
        assert_eq!(
            Rejection::too_large(10_000_000).message,
            "File is larger than 10000000 bytes"
        );
        assert_eq!(Rejection::too_large(1).message, "File is larger than 1 byte");
        assert_eq!(Rejection::too_many_files().message, "Too many files");
    }

    #[test]
    fn test_single_mime_message() {
        let constraints = SelectionConstraints {
            accepted_types: vec![AcceptedType::new("image/png", &[])],
            ..SelectionConstraints::default()
        };
        assert_eq!(
            Rejection::invalid_type(&constraints).message,
            "File type must be image/png"
        );
    }

    #[test]
    fn test_validation_result_coalesces_codes() {
        let mut result = ValidationResult::new();
        result.push(Rejection::too_many_files());
        result.push(Rejection::too_large(10));
        result.push(Rejection::too_many_files());
        result.push(Rejection::too_large(20));

        assert_eq!(result.len(), 2);
        assert_eq!(
            result.codes(),
            vec![RejectionCode::TooManyFiles, RejectionCode::FileTooLarge]
        );
        // 最初のメッセージが残る
        assert_eq!(result.messages()[1], "File is larger than 10 bytes");
    }

    #[test]
    fn test_rejection_code_serialization() {
        let json = serde_json::to_string(&RejectionCode::FileInvalidType).unwrap();
        assert_eq!(json, "\"file-invalid-type\"");
        assert_eq!(RejectionCode::TooManyFiles.to_string(), "too-many-files");
    }
}
