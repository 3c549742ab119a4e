//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use serde_json::Value;

use crate::catalog::LocaleCatalog;

/// テスト用の LocaleCatalog を作成する
///
/// # Arguments
/// * `locale` - ロケール（例: "ko-KR", "en-US"）
/// * `value` - 翻訳データの JSON
pub(crate) fn create_catalog(locale: &str, value: &Value) -> LocaleCatalog {
    LocaleCatalog::from_value(locale, value).unwrap()
}
