//! # UploadCandidate Entity
//!
//! ユーザーが選択したアップロード候補ファイル

use std::path::Path;
use std::sync::Arc;

/// PNGのMIMEタイプ
pub const MIME_PNG: &str = "image/png";
/// JPEGのMIMEタイプ
pub const MIME_JPEG: &str = "image/jpeg";

/// ファイル名の拡張子から宣言MIMEタイプを推定する
///
/// 未知の拡張子は `application/octet-stream` として扱う
pub fn content_type_for_file_name(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// アップロード候補
///
/// ファイル内容は `Arc` で保持するため、コントローラーのスロットと
/// 実行中のワークフローの間で安価に共有できる
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    file_name: String,
    content_type: String,
    content: Arc<[u8]>,
}

impl UploadCandidate {
    /// 新しいアップロード候補を作成
    ///
    /// # Arguments
    ///
    /// * `file_name` - 元のファイル名
    /// * `content_type` - 宣言されたMIMEタイプ
    /// * `content` - ファイル内容
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            content: content.into(),
        }
    }

    /// ファイル名から宣言MIMEタイプを推定して作成
    pub fn from_file_name(file_name: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for_file_name(&file_name);
        Self::new(file_name, content_type, content)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// バイトサイズ
    #[inline]
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// ストレージキーに使う拡張子
    ///
    /// ファイル名の拡張子が宣言MIMEタイプと一致すればそれを使い、
    /// そうでなければMIMEタイプから推定する。どちらも不明なら `bin`
    pub fn extension(&self) -> String {
        let content_type = self.content_type.trim().to_ascii_lowercase();

        let own = Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        if let Some(ext) = own {
            if mime_guess::from_ext(&ext)
                .iter()
                .any(|mime| mime.essence_str() == content_type)
            {
                return ext;
            }
        }

        mime_guess::get_mime_extensions_str(&content_type)
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
            .unwrap_or_else(|| "bin".to_string())
    }
}
