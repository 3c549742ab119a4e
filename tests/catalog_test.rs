//! 翻訳ファイルの読み込みから解決・再読み込み・パリティ検証までの結合テスト

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]
#![allow(missing_docs)]

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};

use googletest::prelude::*;
use i18n_catalog::CatalogRegistry;
use i18n_catalog::config::CatalogSettings;
use i18n_catalog::input::{
    LoadReport,
    LocaleSource,
    load_locales,
};
use i18n_catalog::parity::{
    Discrepancy,
    DiscrepancyKind,
    compare_catalogs,
    compare_placeholders,
};
use serde_json::json;

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

async fn load_fixtures() -> LoadReport {
    load_locales(&fixtures_root(), &CatalogSettings::default()).await.unwrap()
}

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
}

#[tokio::test]
async fn test_fixture_locales_load_without_failures() {
    let report = load_fixtures().await;

    let locales: Vec<&str> = report.sources.iter().map(LocaleSource::locale).collect();
    assert_eq!(locales, vec!["en-US", "ko-KR"]);
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn test_locate_points_into_fixture_file() {
    let report = load_fixtures().await;
    let ko = report.source("ko-KR").unwrap();

    let (path, range) = ko.locate("app-debug.pageTitle").unwrap();

    assert!(path.ends_with("web/i18n/ko-KR/app-debug.json"));
    assert_eq!(range.start.line, 2);
    assert_eq!(range.start.character, 2);
}

#[tokio::test]
async fn test_resolve_with_fallback_and_interpolation() {
    let report = load_fixtures().await;
    let registry = CatalogRegistry::from_settings(&CatalogSettings::default());
    report.register_all(&registry);

    assert_eq!(registry.default_locale(), "en-US");
    assert!(registry.fallback_locales().is_empty());
    assert_eq!(registry.fallback_chain("ko-KR"), vec!["ko-KR".to_string(), "en-US".to_string()]);

    assert_eq!(
        registry.resolve("ko-KR", "app-debug.feature.annotation.remove", &HashMap::new()),
        "삭제"
    );
    assert_eq!(
        registry.resolve(
            "ko-KR",
            "app-debug.errorMessage.nameOfKeyRequired",
            &vars(&[("key", "varName")])
        ),
        "키 이름: varName 이 필요합니다"
    );
    assert_eq!(
        registry.resolve("fr-FR", "app-debug.operation.agree", &HashMap::new()),
        "Like"
    );
    assert_eq!(
        registry.resolve("ko-KR", "app-debug.operation.missing", &HashMap::new()),
        "app-debug.operation.missing"
    );
}

#[tokio::test]
async fn test_reload_swaps_catalog_and_keeps_old_snapshots() {
    let report = load_fixtures().await;
    let registry = CatalogRegistry::new("en-US", Vec::new());
    report.register_all(&registry);
    let before = registry.snapshot("ko-KR").unwrap();

    registry
        .reload("ko-KR", &json!({ "app-debug": { "orchestrate": "오케스트레이션 (새 버전)" } }))
        .unwrap();

    assert_eq!(
        registry.resolve("ko-KR", "app-debug.orchestrate", &HashMap::new()),
        "오케스트레이션 (새 버전)"
    );
    // 新しいカタログにないキーはデフォルトロケールへフォールバックする
    assert_eq!(registry.resolve("ko-KR", "app-debug.operation.agree", &HashMap::new()), "Like");
    assert_eq!(before.get(&"app-debug.operation.agree".parse().unwrap()), Ok("좋아요"));
}

#[tokio::test]
async fn test_reload_rejects_malformed_data() {
    let report = load_fixtures().await;
    let registry = CatalogRegistry::new("en-US", Vec::new());
    report.register_all(&registry);

    let result = registry.reload("ko-KR", &json!({ "app-debug": { "count": 3 } }));

    assert!(result.is_err());
    assert_eq!(registry.resolve("ko-KR", "app-debug.operation.agree", &HashMap::new()), "좋아요");
}

#[tokio::test]
async fn test_fixture_locales_have_matching_structure() {
    let report = load_fixtures().await;
    let reference = report.source("en-US").unwrap().catalog();
    let candidate = report.source("ko-KR").unwrap().catalog();

    assert_that!(compare_catalogs(reference, candidate), is_empty());
    assert_that!(compare_placeholders(reference, candidate), is_empty());
}

#[tokio::test]
async fn test_parity_detects_key_removed_by_reload() {
    let report = load_fixtures().await;
    let registry = CatalogRegistry::new("en-US", Vec::new());
    report.register_all(&registry);

    let mut data = json!({});
    let ko = registry.snapshot("ko-KR").unwrap();
    for (key, value) in ko.root().leaves() {
        if key != "app-debug.feature.annotation.remove" {
            let mut cursor = &mut data;
            let segments: Vec<&str> = key.split('.').collect();
            let (last, parents) = segments.split_last().unwrap();
            for segment in parents {
                cursor = cursor
                    .as_object_mut()
                    .unwrap()
                    .entry((*segment).to_string())
                    .or_insert_with(|| json!({}));
            }
            cursor.as_object_mut().unwrap().insert((*last).to_string(), json!(value));
        }
    }
    registry.reload("ko-KR", &data).unwrap();

    let reference = registry.snapshot("en-US").unwrap();
    let candidate = registry.snapshot("ko-KR").unwrap();

    assert_that!(
        compare_catalogs(&reference, &candidate),
        elements_are![eq(&Discrepancy {
            path: "app-debug.feature.annotation.remove".to_string(),
            kind: DiscrepancyKind::MissingInCandidate,
        })]
    );
}
