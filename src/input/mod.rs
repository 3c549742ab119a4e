//! 翻訳ファイルの読み込みとロケールごとのカタログ構築
/// 翻訳ファイルの探索
pub mod discovery;
/// 翻訳ファイル単体の読み込み
pub mod translation;

use std::collections::{
    BTreeMap,
    HashMap,
};
use std::path::{
    Path,
    PathBuf,
};

use serde_json::{
    Map,
    Value,
};
use thiserror::Error;

use crate::catalog::{
    LocaleCatalog,
    MalformedCatalog,
    MalformedReason,
};
use crate::config::CatalogSettings;
use crate::registry::CatalogRegistry;
use crate::types::SourceRange;
use translation::{
    DocumentError,
    TranslationFile,
    detect_location,
    load_translation_file,
};

/// 読み込み時のエラー
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse {}: {source}", .path.display())]
    Document { path: PathBuf, source: DocumentError },

    #[error(transparent)]
    Malformed(#[from] MalformedCatalog),

    #[error("Invalid file pattern: {0}")]
    Pattern(String),
}

/// 1 ファイル分のキー位置情報
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileKeys {
    /// ファイルパス
    path: PathBuf,
    /// 名前空間を含むキー → キーの位置
    key_ranges: HashMap<String, SourceRange>,
}

/// 構築済みカタログと、その元になったファイルの情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSource {
    /// 構築されたカタログ
    catalog: LocaleCatalog,
    /// 元ファイル（パス昇順）
    files: Vec<FileKeys>,
}

impl LocaleSource {
    #[must_use]
    pub const fn catalog(&self) -> &LocaleCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn locale(&self) -> &str {
        self.catalog.locale()
    }

    /// キーが定義されているファイルと位置を探す
    #[must_use]
    pub fn locate(&self, key: &str) -> Option<(&Path, SourceRange)> {
        self.files
            .iter()
            .find_map(|file| file.key_ranges.get(key).map(|range| (file.path.as_path(), *range)))
    }

    /// 同一ロケールのファイル群を 1 つのカタログにまとめる
    ///
    /// 名前空間付きのファイルはその名前のセグメントに、名前空間なしのファイルはルートにマージする。
    /// 衝突があればロケール全体を不正として扱う。
    pub fn from_files(locale: &str, mut files: Vec<TranslationFile>) -> Result<Self, MalformedCatalog> {
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let mut root = Map::new();
        let mut file_keys = Vec::with_capacity(files.len());
        for file in files {
            match file.location.namespace {
                Some(namespace) => {
                    if !file.value.is_object() {
                        return Err(MalformedCatalog::new(locale, namespace, MalformedReason::RootNotObject));
                    }
                    if root.contains_key(&namespace) {
                        return Err(MalformedCatalog::new(
                            locale,
                            namespace,
                            MalformedReason::NamespaceConflict,
                        ));
                    }
                    root.insert(namespace, file.value);
                }
                None => {
                    let Value::Object(entries) = file.value else {
                        return Err(MalformedCatalog::new(locale, "", MalformedReason::RootNotObject));
                    };
                    for (key, value) in entries {
                        if root.contains_key(&key) {
                            return Err(MalformedCatalog::new(
                                locale,
                                key,
                                MalformedReason::NamespaceConflict,
                            ));
                        }
                        root.insert(key, value);
                    }
                }
            }
            file_keys.push(FileKeys { path: file.path, key_ranges: file.key_ranges });
        }

        let catalog = LocaleCatalog::from_value(locale, &Value::Object(root))?;
        Ok(Self { catalog, files: file_keys })
    }
}

/// 読み込みに失敗したロケール
#[derive(Debug)]
pub struct LocaleFailure {
    pub locale: String,
    pub errors: Vec<LoadError>,
}

/// `load_locales` の結果
///
/// 1 つのロケールの失敗は他のロケールの読み込みに影響しない。
#[derive(Debug, Default)]
pub struct LoadReport {
    /// 構築に成功したロケール（ロケール名の昇順）
    pub sources: Vec<LocaleSource>,
    /// 構築に失敗したロケール（ロケール名の昇順）
    pub failures: Vec<LocaleFailure>,
}

impl LoadReport {
    /// ロケール名で検索
    #[must_use]
    pub fn source(&self, locale: &str) -> Option<&LocaleSource> {
        self.sources.iter().find(|source| source.locale() == locale)
    }

    /// ロケール名で失敗を検索
    #[must_use]
    pub fn failure(&self, locale: &str) -> Option<&LocaleFailure> {
        self.failures.iter().find(|failure| failure.locale == locale)
    }

    /// 構築に成功した全カタログをレジストリに登録する
    pub fn register_all(&self, registry: &CatalogRegistry) {
        for source in &self.sources {
            registry.insert(source.catalog.clone());
        }
    }
}

/// ルート配下の翻訳ファイルを並行して読み込み、ロケールごとにカタログを構築する
///
/// # Errors
/// ファイル探索パターンが不正な場合のみエラーを返す。
/// 個々のファイルやロケールの失敗は `LoadReport::failures` に記録される。
pub async fn load_locales(root: &Path, settings: &CatalogSettings) -> Result<LoadReport, LoadError> {
    let paths = discovery::find_translation_files(root, settings)?;

    let mut pending = Vec::with_capacity(paths.len());
    for path in &paths {
        match detect_location(path) {
            Some(location) => pending.push((path.as_path(), location)),
            None => tracing::warn!(path = %path.display(), "Could not detect locale from path, skipping"),
        }
    }

    // 並列処理でファイルを読み込み
    let futures = pending.into_iter().map(|(path, location)| {
        let locale = location.locale.clone();
        async move { (locale, load_translation_file(path, location).await) }
    });
    let loaded = futures::future::join_all(futures).await;

    let mut by_locale: BTreeMap<String, (Vec<TranslationFile>, Vec<LoadError>)> = BTreeMap::new();
    for (locale, result) in loaded {
        let entry = by_locale.entry(locale).or_default();
        match result {
            Ok(file) => entry.0.push(file),
            Err(e) => entry.1.push(e),
        }
    }

    let mut report = LoadReport::default();
    for (locale, (files, errors)) in by_locale {
        if !errors.is_empty() {
            tracing::warn!(%locale, errors = errors.len(), "Locale rejected because of file errors");
            report.failures.push(LocaleFailure { locale, errors });
            continue;
        }
        match LocaleSource::from_files(&locale, files) {
            Ok(source) => report.sources.push(source),
            Err(e) => {
                tracing::warn!(%locale, error = %e, "Locale rejected");
                report.failures.push(LocaleFailure { locale, errors: vec![e.into()] });
            }
        }
    }

    tracing::debug!(
        loaded = report.sources.len(),
        failed = report.failures.len(),
        "Finished loading locales"
    );
    Ok(report)
}
