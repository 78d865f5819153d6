//! # Domain Services
//!
//! エンティティに属さないビジネスルール
//!
//! - **SelectionValidator**: 選択ファイルの受け入れルール（タイプ/サイズ/数）

pub mod selection_validator;
