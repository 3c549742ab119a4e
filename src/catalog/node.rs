//! 名前空間ツリーのノード定義

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use super::key_path::KEY_SEPARATOR;

/// 名前空間ツリーのノード
///
/// リーフ（テンプレート文字列）か、セグメント名から子ノードへのマップのどちらか一方。
/// 子の挿入順は保持される（解決には影響しないが、パリティ検証の出力順を決定的にする）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// 補間前のテンプレート文字列
    Leaf(String),
    /// セグメント名 → 子ノード
    Branch(IndexMap<String, Node>),
}

/// カタログ構築時の構造違反の種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// ルートがオブジェクトではない
    RootNotObject,
    /// 文字列でもオブジェクトでもない値（数値、真偽値、null、配列）
    UnsupportedValue(&'static str),
    /// 空のセグメント名
    EmptySegment,
    /// セグメント名にキー区切り文字が含まれている
    SeparatorInSegment,
    /// 同一オブジェクト内でキーが重複している
    DuplicateKey,
    /// 名前空間のマウント先が既に使われている
    NamespaceConflict,
    /// ロケール識別子が不正
    InvalidLocale,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotObject => f.write_str("catalog root must be an object"),
            Self::UnsupportedValue(kind) => {
                write!(f, "expected a string or an object, found {kind}")
            }
            Self::EmptySegment => f.write_str("key segment must not be empty"),
            Self::SeparatorInSegment => {
                write!(f, "key segment must not contain '{KEY_SEPARATOR}'")
            }
            Self::DuplicateKey => f.write_str("duplicate key"),
            Self::NamespaceConflict => f.write_str("namespace is defined more than once"),
            Self::InvalidLocale => f.write_str("invalid locale identifier"),
        }
    }
}

/// カタログ構築時の構造エラー
///
/// カタログは全か無かで構築されるため、このエラーが返った場合は
/// 該当ロケールのカタログは一切作られない。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed catalog for locale '{locale}' at '{path}': {reason}")]
pub struct MalformedCatalog {
    pub locale: String,
    /// 違反が見つかったキーパス（ルートの場合は空文字列）
    pub path: String,
    pub reason: MalformedReason,
}

impl MalformedCatalog {
    #[must_use]
    pub fn new(locale: impl Into<String>, path: impl Into<String>, reason: MalformedReason) -> Self {
        Self { locale: locale.into(), path: path.into(), reason }
    }
}

impl Node {
    /// パース済みの JSON 値から名前空間ツリーを構築する
    ///
    /// ルートはオブジェクトでなければならず、全てのリーフは文字列でなければならない。
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use i18n_catalog::catalog::Node;
    ///
    /// let root = Node::from_value("ko-KR", &json!({ "operation": { "agree": "좋아요" } })).unwrap();
    /// assert_eq!(root.leaf_count(), 1);
    /// ```
    pub fn from_value(locale: &str, value: &Value) -> Result<Self, MalformedCatalog> {
        if !value.is_object() {
            return Err(MalformedCatalog::new(locale, "", MalformedReason::RootNotObject));
        }
        convert_value(locale, value, None)
    }

    /// 手で組み立てたツリーのセグメント名を検証する
    ///
    /// `from_value` を経由したツリーは常にこの検証を通る。
    pub fn validate(&self, locale: &str) -> Result<(), MalformedCatalog> {
        validate_node(self, locale, None)
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// リーフであればテンプレート文字列を返す
    #[must_use]
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Self::Leaf(text) => Some(text),
            Self::Branch(_) => None,
        }
    }

    /// 内部ノードであれば子のマップを返す
    #[must_use]
    pub const fn children(&self) -> Option<&IndexMap<String, Self>> {
        match self {
            Self::Leaf(_) => None,
            Self::Branch(children) => Some(children),
        }
    }

    /// 直下の子を取得
    #[must_use]
    pub fn child(&self, segment: &str) -> Option<&Self> {
        self.children()?.get(segment)
    }

    /// 配下のリーフ数
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Branch(children) => children.values().map(Self::leaf_count).sum(),
        }
    }

    /// 配下の全リーフをドット区切りのキーと共に挿入順で列挙する
    #[must_use]
    pub fn leaves(&self) -> Vec<(String, &str)> {
        let mut result = Vec::new();
        collect_leaves(self, None, &mut result);
        result
    }
}

/// `leaves` の再帰部分
fn collect_leaves<'a>(node: &'a Node, prefix: Option<&str>, result: &mut Vec<(String, &'a str)>) {
    match node {
        Node::Leaf(text) => {
            if let Some(key) = prefix {
                result.push((key.to_string(), text.as_str()));
            }
        }
        Node::Branch(children) => {
            for (segment, child) in children {
                let full_key = join_path(prefix, segment);
                collect_leaves(child, Some(&full_key), result);
            }
        }
    }
}

/// 親パスとセグメントを連結する
pub(crate) fn join_path(prefix: Option<&str>, segment: &str) -> String {
    prefix.map_or_else(|| segment.to_string(), |p| format!("{p}{KEY_SEPARATOR}{segment}"))
}

/// JSON 値の種類名（エラーメッセージ用）
const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// セグメント名が空でなく、区切り文字を含まないことを確認する
fn check_segment(locale: &str, segment: &str, full_key: &str) -> Result<(), MalformedCatalog> {
    if segment.is_empty() {
        return Err(MalformedCatalog::new(locale, full_key, MalformedReason::EmptySegment));
    }
    if segment.contains(KEY_SEPARATOR) {
        return Err(MalformedCatalog::new(locale, full_key, MalformedReason::SeparatorInSegment));
    }
    Ok(())
}

/// `Node::validate` の再帰部分
fn validate_node(node: &Node, locale: &str, prefix: Option<&str>) -> Result<(), MalformedCatalog> {
    let Node::Branch(children) = node else {
        return Ok(());
    };
    for (segment, child) in children {
        let full_key = join_path(prefix, segment);
        check_segment(locale, segment, &full_key)?;
        validate_node(child, locale, Some(&full_key))?;
    }
    Ok(())
}

/// `Node::from_value` の再帰部分
fn convert_value(locale: &str, value: &Value, prefix: Option<&str>) -> Result<Node, MalformedCatalog> {
    match value {
        Value::String(text) => Ok(Node::Leaf(text.clone())),
        Value::Object(map) => {
            let mut children = IndexMap::with_capacity(map.len());
            for (segment, child) in map {
                let full_key = join_path(prefix, segment);
                check_segment(locale, segment, &full_key)?;
                let node = convert_value(locale, child, Some(&full_key))?;
                children.insert(segment.clone(), node);
            }
            Ok(Node::Branch(children))
        }
        other => Err(MalformedCatalog::new(
            locale,
            prefix.unwrap_or_default(),
            MalformedReason::UnsupportedValue(value_kind(other)),
        )),
    }
}
