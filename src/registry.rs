//! ロケールカタログの登録とフォールバック解決

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde_json::Value;

use crate::catalog::{
    KeyPath,
    LocaleCatalog,
    MalformedCatalog,
};
use crate::config::CatalogSettings;
use crate::interpolate::interpolate;

/// ロケール識別子 → カタログ
type CatalogMap = HashMap<String, Arc<LocaleCatalog>>;

/// フォールバックを含めて見つかった生テンプレート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// テンプレートを提供したロケール
    pub locale: String,
    /// 補間前のテンプレート
    pub template: String,
}

/// 全ロケールのカタログを所有し、フォールバック付きでキーを解決する
///
/// 読み取り（`resolve` / `lookup`）はロックを取らずに並行して呼び出せる。
/// 書き込み（`insert` / `reload`）は内部のミューテックスで直列化され、
/// 新しいカタログ集合はポインタの差し替えで公開されるため、
/// 読み取り側が古いツリーと新しいツリーの混在を観測することはない。
#[derive(Debug)]
pub struct CatalogRegistry {
    /// 公開中のカタログ集合
    catalogs: ArcSwap<CatalogMap>,
    /// 書き込みを直列化するためのロック
    writer: Mutex<()>,
    /// 最後に試すロケール
    default_locale: String,
    /// ヒントの次に順に試すロケール
    fallback_locales: Vec<String>,
}

impl CatalogRegistry {
    /// 空のレジストリを作成
    #[must_use]
    pub fn new(default_locale: impl Into<String>, fallback_locales: Vec<String>) -> Self {
        Self {
            catalogs: ArcSwap::from_pointee(CatalogMap::new()),
            writer: Mutex::new(()),
            default_locale: default_locale.into(),
            fallback_locales,
        }
    }

    /// 設定のデフォルトロケールとフォールバックから作成
    #[must_use]
    pub fn from_settings(settings: &CatalogSettings) -> Self {
        Self::new(settings.default_locale.clone(), settings.fallback_locales.clone())
    }

    #[must_use]
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    #[must_use]
    pub fn fallback_locales(&self) -> &[String] {
        &self.fallback_locales
    }

    /// 構築済みのカタログを登録する（同じロケールがあれば置き換える）
    pub fn insert(&self, catalog: LocaleCatalog) {
        let locale = catalog.locale().to_string();
        self.publish(locale, Arc::new(catalog));
    }

    /// 1 ロケールのカタログを新しいデータで置き換える
    ///
    /// データが不正な場合は既存のカタログに一切触れずにエラーを返す。
    pub fn reload(&self, locale: &str, data: &Value) -> Result<(), MalformedCatalog> {
        let catalog = LocaleCatalog::from_value(locale, data).inspect_err(|e| {
            tracing::warn!(locale, error = %e, "Rejected catalog reload");
        })?;
        self.publish(locale.to_string(), Arc::new(catalog));
        tracing::debug!(locale, "Reloaded catalog");
        Ok(())
    }

    /// 現在のカタログ集合をコピーし、1 ロケールを差し替えて公開する
    fn publish(&self, locale: String, catalog: Arc<LocaleCatalog>) {
        let _guard = self.writer.lock();
        let mut next = CatalogMap::clone(&self.catalogs.load());
        next.insert(locale, catalog);
        self.catalogs.store(Arc::new(next));
    }

    /// 現在公開されているカタログを取得
    #[must_use]
    pub fn snapshot(&self, locale: &str) -> Option<Arc<LocaleCatalog>> {
        self.catalogs.load().get(locale).cloned()
    }

    /// 読み込み済みロケールの一覧（昇順）
    #[must_use]
    pub fn locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.catalogs.load().keys().cloned().collect();
        locales.sort();
        locales
    }

    /// 解決時に試すロケールの順序（読み込み済みのもののみ、重複なし）
    ///
    /// ヒント → フォールバック → デフォルトの順。
    #[must_use]
    pub fn fallback_chain(&self, locale_hint: &str) -> Vec<String> {
        let catalogs = self.catalogs.load();
        self.candidates(locale_hint)
            .into_iter()
            .filter(|locale| catalogs.contains_key(*locale))
            .map(str::to_string)
            .collect()
    }

    /// 候補ロケールを重複を除いて並べる
    fn candidates<'a>(&'a self, locale_hint: &'a str) -> Vec<&'a str> {
        let mut chain: Vec<&str> = Vec::with_capacity(self.fallback_locales.len() + 2);
        let ordered = std::iter::once(locale_hint)
            .chain(self.fallback_locales.iter().map(String::as_str))
            .chain(std::iter::once(self.default_locale.as_str()));
        for locale in ordered {
            if !chain.contains(&locale) {
                chain.push(locale);
            }
        }
        chain
    }

    /// フォールバックを辿って生テンプレートを探す（補間なし）
    #[must_use]
    pub fn lookup(&self, locale_hint: &str, key: &str) -> Option<Resolved> {
        let path = match KeyPath::parse(key) {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!(key, error = %e, "Invalid translation key");
                return None;
            }
        };

        // 1 回の解決は同じスナップショットに対して行う
        let catalogs = self.catalogs.load();
        for locale in self.candidates(locale_hint) {
            let Some(catalog) = catalogs.get(locale) else {
                continue;
            };
            match catalog.get(&path) {
                Ok(template) => {
                    if locale != locale_hint {
                        tracing::debug!(key, locale_hint, locale, "Resolved through fallback");
                    }
                    return Some(Resolved {
                        locale: locale.to_string(),
                        template: template.to_string(),
                    });
                }
                Err(e) => tracing::trace!(locale, error = %e, "Key missing in locale"),
            }
        }

        tracing::debug!(key, locale_hint, "Translation key not found in any locale");
        None
    }

    /// キーを解決し、プレースホルダーを補間した表示用文字列を返す
    ///
    /// どのロケールにもキーが見つからない場合はキー文字列そのものを返すため、
    /// 呼び出し側が失敗を受け取ることはない。
    #[must_use]
    #[allow(clippy::implicit_hasher)]
    pub fn resolve(
        &self,
        locale_hint: &str,
        key: &str,
        variables: &HashMap<String, String>,
    ) -> String {
        self.lookup(locale_hint, key)
            .map_or_else(|| key.to_string(), |resolved| interpolate(&resolved.template, variables))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::{
        fixture,
        rstest,
    };
    use serde_json::json;

    use super::*;
    use crate::test_utils::create_catalog;

    fn no_vars() -> HashMap<String, String> {
        HashMap::new()
    }

    #[fixture]
    fn registry() -> CatalogRegistry {
        let registry = CatalogRegistry::new("en-US", vec!["ja-JP".to_string()]);
        registry.insert(create_catalog(
            "ko-KR",
            &json!({
                "feature": { "annotation": { "remove": "삭제" } },
                "notValid": "{{key}}가 유효하지 않습니다"
            }),
        ));
        registry.insert(create_catalog(
            "ja-JP",
            &json!({
                "feature": { "annotation": { "edit": "編集" } },
                "shared": "日本語"
            }),
        ));
        registry.insert(create_catalog(
            "en-US",
            &json!({
                "feature": { "annotation": { "edit": "Edit", "add": "Add" } },
                "shared": "English"
            }),
        ));
        registry
    }

    #[rstest]
    fn resolve_from_hint_locale(registry: CatalogRegistry) {
        assert_that!(registry.resolve("ko-KR", "feature.annotation.remove", &no_vars()), eq("삭제"));
    }

    #[rstest]
    fn resolve_interpolates_variables(registry: CatalogRegistry) {
        let vars = HashMap::from([("key".to_string(), "변수".to_string())]);

        assert_that!(registry.resolve("ko-KR", "notValid", &vars), eq("변수가 유효하지 않습니다"));
    }

    #[rstest]
    fn resolve_uses_fallback_before_default(registry: CatalogRegistry) {
        assert_that!(registry.resolve("ko-KR", "feature.annotation.edit", &no_vars()), eq("編集"));
        assert_that!(registry.resolve("ko-KR", "shared", &no_vars()), eq("日本語"));
    }

    #[rstest]
    fn resolve_uses_default_last(registry: CatalogRegistry) {
        assert_that!(registry.resolve("ko-KR", "feature.annotation.add", &no_vars()), eq("Add"));
    }

    #[rstest]
    #[case("feature.nonexistent.title")]
    #[case("feature.annotation")]
    #[case("feature..remove")]
    #[case("")]
    fn resolve_echoes_key_when_missing_everywhere(registry: CatalogRegistry, #[case] key: &str) {
        assert_that!(registry.resolve("ko-KR", key, &no_vars()), eq(key));
    }

    #[rstest]
    fn resolve_with_unknown_hint_starts_at_fallbacks(registry: CatalogRegistry) {
        assert_that!(registry.resolve("fr-FR", "shared", &no_vars()), eq("日本語"));
    }

    #[rstest]
    fn lookup_reports_providing_locale(registry: CatalogRegistry) {
        let resolved = registry.lookup("ko-KR", "feature.annotation.add");

        assert_that!(
            resolved,
            some(all![
                field!(Resolved.locale, eq("en-US")),
                field!(Resolved.template, eq("Add"))
            ])
        );
    }

    #[rstest]
    fn fallback_chain_is_deduplicated_and_loaded_only(registry: CatalogRegistry) {
        assert_that!(registry.fallback_chain("ko-KR"), elements_are![eq("ko-KR"), eq("ja-JP"), eq("en-US")]);
        assert_that!(registry.fallback_chain("en-US"), elements_are![eq("en-US"), eq("ja-JP")]);
        assert_that!(registry.fallback_chain("fr-FR"), elements_are![eq("ja-JP"), eq("en-US")]);
    }

    #[rstest]
    fn reload_replaces_whole_catalog(registry: CatalogRegistry) {
        let result = registry.reload("ko-KR", &json!({ "feature": { "annotation": { "add": "추가" } } }));

        assert_that!(result, ok(anything()));
        assert_that!(registry.resolve("ko-KR", "feature.annotation.add", &no_vars()), eq("추가"));
        // 古いキーは残らない
        assert_that!(
            registry.resolve("ko-KR", "feature.annotation.remove", &no_vars()),
            eq("feature.annotation.remove")
        );
    }

    #[rstest]
    fn reload_malformed_keeps_previous_catalog(registry: CatalogRegistry) {
        let before = registry.snapshot("ko-KR").unwrap();

        let result = registry.reload("ko-KR", &json!({ "feature": { "annotation": { "remove": 1 } } }));

        assert_that!(result, err(field!(MalformedCatalog.path, eq("feature.annotation.remove"))));
        let after = registry.snapshot("ko-KR").unwrap();
        assert_that!(Arc::ptr_eq(&before, &after), eq(true));
        assert_that!(registry.resolve("ko-KR", "feature.annotation.remove", &no_vars()), eq("삭제"));
    }

    #[rstest]
    fn reload_adds_new_locale(registry: CatalogRegistry) {
        registry.reload("de-DE", &json!({ "shared": "Deutsch" })).unwrap();

        assert_that!(registry.locales(), elements_are![eq("de-DE"), eq("en-US"), eq("ja-JP"), eq("ko-KR")]);
        assert_that!(registry.resolve("de-DE", "shared", &no_vars()), eq("Deutsch"));
    }

    #[test]
    fn concurrent_readers_never_observe_mixed_catalogs() {
        fn generation(value: &str) -> Value {
            json!({ "a": { "x": value }, "b": { "y": value } })
        }

        let registry = CatalogRegistry::new("en-US", Vec::new());
        registry.reload("en-US", &generation("0")).unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 1..200 {
                    registry.reload("en-US", &generation(&i.to_string())).unwrap();
                }
            });
            for _ in 0..4 {
                scope.spawn(|| {
                    let x = KeyPath::parse("a.x").unwrap();
                    let y = KeyPath::parse("b.y").unwrap();
                    for _ in 0..500 {
                        let snapshot = registry.snapshot("en-US").unwrap();
                        assert_eq!(snapshot.get(&x), snapshot.get(&y));
                    }
                });
            }
        });

        assert_eq!(registry.resolve("en-US", "a.x", &HashMap::new()), "199");
    }
}
