//! ドット区切りキーの解析と名前空間ツリーの探索

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::node::Node;

/// キーパスのセグメント区切り文字
pub const KEY_SEPARATOR: char = '.';

/// キー文字列として不正な場合のエラー
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidKeyPath {
    #[error("Key path must not be empty")]
    Empty,
    #[error("Key path has an empty segment at index {0}")]
    EmptySegment(usize),
}

/// 空でないセグメント列として表現されたキーパス
///
/// セグメントは大文字小文字を区別する。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// ドット区切りの文字列を解析する
    ///
    /// # Examples
    /// ```
    /// use i18n_catalog::catalog::KeyPath;
    ///
    /// let path = KeyPath::parse("feature.annotation.remove").unwrap();
    /// assert_eq!(path.len(), 3);
    /// assert!(KeyPath::parse("feature..remove").is_err());
    /// ```
    pub fn parse(key: &str) -> Result<Self, InvalidKeyPath> {
        if key.is_empty() {
            return Err(InvalidKeyPath::Empty);
        }
        let segments = key
            .split(KEY_SEPARATOR)
            .enumerate()
            .map(|(index, segment)| {
                if segment.is_empty() {
                    Err(InvalidKeyPath::EmptySegment(index))
                } else {
                    Ok(segment.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.segments.len()
    }

    /// 常に `false`（空のキーパスは構築できない）
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for KeyPath {
    type Err = InvalidKeyPath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, "{KEY_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// キー解決が失敗した理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// 内部ノードに該当する子が存在しない
    MissingSegment,
    /// パスを消費し切る前にリーフに到達した
    LeafBeforeEnd,
    /// パスを消費し切ったが内部ノードで終わった
    NotALeaf,
}

/// キーが見つからなかったことを表すエラー
///
/// `depth` は失敗時点までに辿れたセグメント数。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Translation key '{path}' not found (stopped at depth {depth}: {reason:?})")]
pub struct KeyNotFound {
    pub path: String,
    pub depth: usize,
    pub reason: NotFoundReason,
}

/// 名前空間ツリーをキーパスに沿って辿り、終端リーフの生テンプレートを返す
///
/// 副作用を持たず、探索はキーパスの長さで必ず終わる。
pub fn resolve_key<'a>(root: &'a Node, path: &KeyPath) -> Result<&'a str, KeyNotFound> {
    let not_found = |depth, reason| KeyNotFound { path: path.to_string(), depth, reason };

    let mut current = root;
    for (depth, segment) in path.segments().iter().enumerate() {
        current = match current {
            Node::Leaf(_) => return Err(not_found(depth, NotFoundReason::LeafBeforeEnd)),
            Node::Branch(children) => children
                .get(segment)
                .ok_or_else(|| not_found(depth, NotFoundReason::MissingSegment))?,
        };
    }

    current.as_leaf().ok_or_else(|| not_found(path.len(), NotFoundReason::NotALeaf))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn sample_root() -> Node {
        Node::from_value(
            "ko-KR",
            &json!({
                "feature": {
                    "annotation": {
                        "remove": "삭제",
                        "scoreThreshold": { "title": "점수 임계값" }
                    }
                },
                "orchestrate": "오케스트레이션"
            }),
        )
        .unwrap()
    }

    #[rstest]
    #[case("feature.annotation.remove", "삭제")]
    #[case("feature.annotation.scoreThreshold.title", "점수 임계값")]
    #[case("orchestrate", "오케스트레이션")]
    fn test_resolve_key_found(#[case] key: &str, #[case] expected: &str) {
        let root = sample_root();
        let path = KeyPath::parse(key).unwrap();

        assert_eq!(resolve_key(&root, &path), Ok(expected));
    }

    #[rstest]
    #[case::missing_top("nonexistent.title", 0, NotFoundReason::MissingSegment)]
    #[case::missing_nested("feature.nonexistent.title", 1, NotFoundReason::MissingSegment)]
    #[case::leaf_before_end("orchestrate.title", 1, NotFoundReason::LeafBeforeEnd)]
    #[case::ends_on_branch("feature.annotation", 2, NotFoundReason::NotALeaf)]
    #[case::case_sensitive("Feature.annotation.remove", 0, NotFoundReason::MissingSegment)]
    fn test_resolve_key_not_found(
        #[case] key: &str,
        #[case] depth: usize,
        #[case] reason: NotFoundReason,
    ) {
        let root = sample_root();
        let path = KeyPath::parse(key).unwrap();

        assert_that!(
            resolve_key(&root, &path),
            err(all![
                field!(KeyNotFound.path, eq(key)),
                field!(KeyNotFound.depth, eq(&depth)),
                field!(KeyNotFound.reason, eq(&reason))
            ])
        );
    }

    #[rstest]
    #[case("", InvalidKeyPath::Empty)]
    #[case(".a", InvalidKeyPath::EmptySegment(0))]
    #[case("a..b", InvalidKeyPath::EmptySegment(1))]
    #[case("a.b.", InvalidKeyPath::EmptySegment(2))]
    fn test_parse_invalid(#[case] key: &str, #[case] expected: InvalidKeyPath) {
        assert_that!(KeyPath::parse(key), err(eq(&expected)));
    }

    #[googletest::test]
    fn test_display_round_trips_original_key() {
        let path: KeyPath = "feature.annotation.remove".parse().unwrap();

        expect_that!(path.to_string(), eq("feature.annotation.remove"));
        expect_that!(path.segments(), elements_are![eq("feature"), eq("annotation"), eq("remove")]);
    }
}
