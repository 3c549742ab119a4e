//! 翻訳ファイルの探索

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;

use super::LoadError;
use crate::config::CatalogSettings;

/// パターンのリストから `GlobSet` をビルド
fn build_glob_set(patterns: &[String]) -> Result<GlobSet, LoadError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| LoadError::Pattern(format!("Invalid pattern '{pattern}': {e}")))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| LoadError::Pattern(format!("Failed to build patterns: {e}")))
}

/// ルート配下の翻訳ファイルを検索
///
/// 結果はパスの昇順に並ぶ。
pub fn find_translation_files(
    root: &Path,
    settings: &CatalogSettings,
) -> Result<Vec<PathBuf>, LoadError> {
    let include_set = build_glob_set(std::slice::from_ref(&settings.translation_files.file_pattern))?;
    let exclude_set = build_glob_set(&settings.exclude_patterns)?;

    let mut found_files = Vec::new();
    // ignore クレートでファイルを走査
    for result in WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        // ファイルのみを対象
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();

        // ルートからの相対パスで判定
        let Ok(relative_path) = path.strip_prefix(root) else {
            continue;
        };
        if !include_set.is_match(relative_path) || exclude_set.is_match(relative_path) {
            continue;
        }

        found_files.push(path.to_path_buf());
    }

    found_files.sort();
    tracing::debug!(root = %root.display(), count = found_files.len(), "Found translation files");
    Ok(found_files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    #[rstest]
    fn finds_matching_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "web/i18n/ko-KR/app-debug.json");
        touch(temp_dir.path(), "web/i18n/en-US/app-debug.json");
        touch(temp_dir.path(), "web/i18n/en-US/common.jsonc");
        touch(temp_dir.path(), "web/src/config.json");
        touch(temp_dir.path(), "node_modules/pkg/locales/en.json");

        let files = find_translation_files(temp_dir.path(), &CatalogSettings::default()).unwrap();
        let relative: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_that!(
            relative,
            elements_are![
                eq("web/i18n/en-US/app-debug.json"),
                eq("web/i18n/en-US/common.jsonc"),
                eq("web/i18n/ko-KR/app-debug.json")
            ]
        );
    }

    #[rstest]
    fn invalid_pattern_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let settings = CatalogSettings {
            exclude_patterns: vec!["invalid[pattern".to_string()],
            ..CatalogSettings::default()
        };

        let result = find_translation_files(temp_dir.path(), &settings);

        assert!(matches!(result, Err(LoadError::Pattern(_))));
    }
}
