//! `{{name}}` プレースホルダーの走査と置換

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{
    Captures,
    Regex,
};

/// `{{identifier}}` にマッチするパターン（識別子は英数字とアンダースコア）
///
/// マッチは左から順に重ならないように取られる。対応の取れない記号や
/// 識別子として不正な中身はマッチせず、テキストのまま残る。
#[allow(clippy::unwrap_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").unwrap());

/// テンプレート中のプレースホルダーを値で置換する
///
/// - 値が与えられていないプレースホルダーはそのまま残す
/// - 空文字列の値は有効な置換として扱う
/// - 置換後の値は再走査しない
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use i18n_catalog::interpolate::interpolate;
///
/// let vars = HashMap::from([("key".to_string(), "varName".to_string())]);
/// assert_eq!(interpolate("키 이름: {{key}} 이 필요합니다", &vars), "키 이름: varName 이 필요합니다");
/// assert_eq!(interpolate("{{x}}", &HashMap::new()), "{{x}}");
/// ```
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn interpolate(template: &str, variables: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let raw = caps.get(0).map_or("", |m| m.as_str());
            caps.get(1)
                .and_then(|name| variables.get(name.as_str()))
                .map_or_else(|| raw.to_string(), Clone::clone)
        })
        .into_owned()
}

/// テンプレートが参照するプレースホルダー名を出現順に返す（重複を含む）
#[must_use]
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}
