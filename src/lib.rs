//! i18n-catalog
//!
//! 翻訳リソースカタログ。ドット区切りキーの解決、`{{name}}` の埋め込み、
//! ロケールのフォールバック、ロケール間の構造パリティ検証を提供する。

pub mod catalog;
pub mod cli;
pub mod config;
pub mod input;
pub mod interpolate;
pub mod parity;
pub mod registry;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use catalog::{
    KeyPath,
    LocaleCatalog,
    Node,
};
pub use registry::CatalogRegistry;
