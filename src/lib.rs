//! # ProductAI
//!
//! 商品写真をオブジェクトストレージにアップロードし、背景を除去するツール
//!
//! このプロジェクトはクリーンアーキテクチャを採用しており、以下の4層で構成されています：
//!
//! - **Domain層**: 選択ルール、ワークフロー状態、エラー分類（外部依存なし）
//! - **Application層**: アップロードワークフロー、セッションガード、背景除去
//! - **Adapter層**: 外部システムとの統合（ストレージ、認証プロバイダー、Replicate）
//! - **Driver層**: CLI/HTTPサーバー、依存性注入

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
// カバレッジ計測時に外部サービス依存コードを除外するために使用
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Domain層（純粋なビジネスロジック）
pub mod domain;

// Application層（ユースケース）
pub mod application;

// Adapter層（Infrastructure）
pub mod adapter;

// Driver層（Presentation）
pub mod driver;
