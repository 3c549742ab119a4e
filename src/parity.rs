//! ロケール間の構造パリティ検証
//!
//! 参照カタログと候補カタログのツリー形状を比較する。文字列の内容は比較しない。
//! CI での利用を想定しており、解決処理の経路では使われない。

use std::fmt;

use indexmap::IndexSet;

use crate::catalog::{
    KeyPath,
    LocaleCatalog,
    Node,
    join_path,
    resolve_key,
};
use crate::interpolate::placeholders;

/// 差分の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscrepancyKind {
    /// 参照にあり候補にない
    MissingInCandidate,
    /// 候補にあり参照にない
    ExtraInCandidate,
    /// 一方がリーフで他方が内部ノード
    TypeMismatch,
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingInCandidate => "missing",
            Self::ExtraInCandidate => "extra",
            Self::TypeMismatch => "type-mismatch",
        })
    }
}

/// 1 件の構造差分
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Discrepancy {
    pub path: String,
    pub kind: DiscrepancyKind,
}

/// 両方でリーフになっているキーのプレースホルダー名の差分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderMismatch {
    pub path: String,
    /// 参照にあり候補にない名前（出現順）
    pub missing: Vec<String>,
    /// 候補にあり参照にない名前（出現順）
    pub extra: Vec<String>,
}

/// 2 つのカタログの構造を比較する
///
/// 出力は参照の挿入順による深さ優先で、各ノードでは参照側の子（欠落・型不一致・再帰）を先に、
/// 候補のみの子（余剰）を候補側の順で後に並べる。
/// 欠落・余剰のサブツリーはその根のパスで 1 件として報告する。
#[must_use]
pub fn compare_catalogs(reference: &LocaleCatalog, candidate: &LocaleCatalog) -> Vec<Discrepancy> {
    let discrepancies = compare_trees(reference.root(), candidate.root());
    tracing::debug!(
        reference = reference.locale(),
        candidate = candidate.locale(),
        count = discrepancies.len(),
        "Compared catalogs"
    );
    discrepancies
}

/// 2 つの名前空間ツリーの構造を比較する
#[must_use]
pub fn compare_trees(reference: &Node, candidate: &Node) -> Vec<Discrepancy> {
    let mut discrepancies = Vec::new();
    diff_nodes(reference, candidate, None, &mut discrepancies);
    discrepancies
}

/// `compare_trees` の再帰部分
fn diff_nodes(
    reference: &Node,
    candidate: &Node,
    prefix: Option<&str>,
    discrepancies: &mut Vec<Discrepancy>,
) {
    match (reference, candidate) {
        (Node::Leaf(_), Node::Leaf(_)) => {}
        (Node::Branch(reference_children), Node::Branch(candidate_children)) => {
            for (segment, reference_child) in reference_children {
                let path = join_path(prefix, segment);
                match candidate_children.get(segment) {
                    Some(candidate_child) => {
                        diff_nodes(reference_child, candidate_child, Some(&path), discrepancies);
                    }
                    None => discrepancies
                        .push(Discrepancy { path, kind: DiscrepancyKind::MissingInCandidate }),
                }
            }
            for segment in candidate_children.keys() {
                if !reference_children.contains_key(segment) {
                    discrepancies.push(Discrepancy {
                        path: join_path(prefix, segment),
                        kind: DiscrepancyKind::ExtraInCandidate,
                    });
                }
            }
        }
        _ => discrepancies.push(Discrepancy {
            path: prefix.unwrap_or_default().to_string(),
            kind: DiscrepancyKind::TypeMismatch,
        }),
    }
}

/// 両方でリーフになっているキーについて、プレースホルダー名の集合を比較する
#[must_use]
pub fn compare_placeholders(
    reference: &LocaleCatalog,
    candidate: &LocaleCatalog,
) -> Vec<PlaceholderMismatch> {
    reference
        .root()
        .leaves()
        .into_iter()
        .filter_map(|(key, reference_template)| {
            let path = KeyPath::parse(&key).ok()?;
            let candidate_template = resolve_key(candidate.root(), &path).ok()?;

            let reference_names: IndexSet<&str> = placeholders(reference_template).into_iter().collect();
            let candidate_names: IndexSet<&str> = placeholders(candidate_template).into_iter().collect();

            let missing: Vec<String> = reference_names
                .difference(&candidate_names)
                .map(|name| (*name).to_string())
                .collect();
            let extra: Vec<String> = candidate_names
                .difference(&reference_names)
                .map(|name| (*name).to_string())
                .collect();

            (!missing.is_empty() || !extra.is_empty()).then_some(PlaceholderMismatch {
                path: key,
                missing,
                extra,
            })
        })
        .collect()
}
