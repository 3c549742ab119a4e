//! 単一ロケールのカタログ

use std::time::SystemTime;

use serde_json::Value;

use super::key_path::{
    KeyNotFound,
    KeyPath,
    resolve_key,
};
use super::node::{
    MalformedCatalog,
    MalformedReason,
    Node,
};

/// 1 ロケール分の名前空間ツリーとメタデータ
///
/// 構築後は不変。再読み込みはカタログ全体の差し替えで行う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleCatalog {
    /// ロケール識別子（例: `ko-KR`）
    locale: String,
    /// ルートノード（常に内部ノード）
    root: Node,
    /// 構築時刻
    loaded_at: SystemTime,
}

impl LocaleCatalog {
    /// パース済みデータからカタログを構築する
    ///
    /// 構造が不正な場合は部分的なカタログを作らずにエラーを返す。
    pub fn from_value(locale: &str, value: &Value) -> Result<Self, MalformedCatalog> {
        let root = Node::from_value(locale, value)?;
        Self::build(locale, root)
    }

    /// 構築済みのツリーからカタログを作成する
    ///
    /// 全てのセグメント名を検証し、空のものや区切り文字を含むものがあればエラーを返す。
    pub fn from_root(locale: &str, root: Node) -> Result<Self, MalformedCatalog> {
        root.validate(locale)?;
        Self::build(locale, root)
    }

    /// ロケールとルートの形を確認してカタログを作る
    fn build(locale: &str, root: Node) -> Result<Self, MalformedCatalog> {
        if !is_locale_tag(locale) {
            return Err(MalformedCatalog::new(locale, "", MalformedReason::InvalidLocale));
        }
        if root.is_leaf() {
            return Err(MalformedCatalog::new(locale, "", MalformedReason::RootNotObject));
        }
        tracing::debug!(locale, leaves = root.leaf_count(), "Built locale catalog");
        Ok(Self { locale: locale.to_string(), root, loaded_at: SystemTime::now() })
    }

    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    #[must_use]
    pub const fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }

    /// キーの生テンプレートを取得（補間なし）
    pub fn get(&self, path: &KeyPath) -> Result<&str, KeyNotFound> {
        resolve_key(&self.root, path)
    }
}

/// ロケールタグらしい文字列かどうか
///
/// `ko`, `ko-KR`, `en_US`, `zh-Hant-TW`, `es-419` のように、
/// 言語サブタグの後に任意の文字体系（英字 4 文字）と地域（英字 2 文字または数字 3 文字）が続く形を受け付ける。
/// 3 文字の言語サブタグは `app` のような名前空間と区別するため、後続のサブタグを必須とする。
#[must_use]
pub fn is_locale_tag(tag: &str) -> bool {
    let mut subtags = tag.split(['-', '_']);
    let Some(language) = subtags.next() else {
        return false;
    };
    let rest: Vec<&str> = subtags.collect();

    let language_ok = language.chars().all(|c| c.is_ascii_alphabetic())
        && (language.len() == 2 || (language.len() == 3 && !rest.is_empty()));
    if !language_ok {
        return false;
    }

    match rest.as_slice() {
        [] => true,
        [subtag] => is_script(subtag) || is_region(subtag),
        [script, region] => is_script(script) && is_region(region),
        _ => false,
    }
}

/// 文字体系サブタグ（例: `Hant`）
fn is_script(subtag: &str) -> bool {
    subtag.len() == 4 && subtag.chars().all(|c| c.is_ascii_alphabetic())
}

/// 地域サブタグ（例: `KR`, `419`）
fn is_region(subtag: &str) -> bool {
    (subtag.len() == 2 && subtag.chars().all(|c| c.is_ascii_alphabetic()))
        || (subtag.len() == 3 && subtag.chars().all(|c| c.is_ascii_digit()))
}
