//! Translation file input definitions

use std::collections::{
    HashMap,
    HashSet,
};
use std::path::{
    Path,
    PathBuf,
};

use jsonc_parser::ParseOptions;
use serde_json::Value;
use thiserror::Error;

use super::LoadError;
use crate::catalog::{
    MalformedCatalog,
    MalformedReason,
    is_locale_tag,
    join_path,
};
use crate::types::{
    SourcePosition,
    SourceRange,
};

/// Parent directories that never name a namespace.
const COMMON_PARENTS: &[&str] = &["locales", "messages", "translations", "i18n", "lang", "langs"];

/// Errors from parsing a translation document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("syntax error at {position}: {message}")]
    Syntax { position: SourcePosition, message: String },
    #[error("document is empty")]
    Empty,
    #[error("duplicate key '{key}' at {position}")]
    DuplicateKey { key: String, position: SourcePosition },
    #[error("failed to initialize JSON parser: {0}")]
    Parser(String),
}

/// A parsed translation document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub value: Value,
    /// Dot-separated key to key source range mapping.
    pub key_ranges: HashMap<String, SourceRange>,
}

/// Where a translation file belongs, inferred from its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    pub locale: String,
    /// Namespace the document is mounted at (e.g., "app-debug").
    pub namespace: Option<String>,
}

/// A loaded translation file.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationFile {
    pub path: PathBuf,
    pub location: FileLocation,
    pub value: Value,
    /// Key ranges, prefixed with the namespace when there is one.
    pub key_ranges: HashMap<String, SourceRange>,
}

/// Normalize locale tag (replace `_` with `-`)
fn normalize_locale(tag: &str) -> String {
    tag.replace('_', "-")
}

/// Detect locale and namespace from file path.
///
/// # Examples
/// - `locales/ko-KR/app-debug.json` -> `ko-KR`, Some("app-debug")
/// - `locales/ko-KR.json` -> `ko-KR`, None
/// - `locales/common/en.json` -> `en`, Some("common")
/// - `locales/en_US/common.json` -> `en-US`, Some("common")
/// - `locales/common/app.json` -> None (no locale)
#[must_use]
pub fn detect_location(file_path: &Path) -> Option<FileLocation> {
    let file_stem = file_path.file_stem()?.to_string_lossy().to_string();
    let parent_name = file_path
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().to_string());

    // Parent directory is the locale, file name is the namespace
    if let Some(parent) = parent_name.as_deref()
        && is_locale_tag(parent)
    {
        return Some(FileLocation {
            locale: normalize_locale(parent),
            namespace: Some(file_stem),
        });
    }

    if !is_locale_tag(&file_stem) {
        return None;
    }

    // File name is the locale, parent directory is the namespace unless it is a common parent
    let namespace = parent_name
        .filter(|parent| !COMMON_PARENTS.contains(&parent.to_lowercase().as_str()));

    Some(FileLocation { locale: normalize_locale(&file_stem), namespace })
}

/// Parse JSON text (comments and trailing commas allowed) into a value and its key ranges.
///
/// The value comes from `jsonc-parser`. Key ranges and duplicate keys come from tree-sitter,
/// since the parsed value silently keeps the last of duplicated keys.
pub fn parse_document(text: &str) -> Result<ParsedDocument, DocumentError> {
    let options = ParseOptions { allow_loose_object_property_names: false, ..ParseOptions::default() };
    let parsed: Option<Value> = jsonc_parser::parse_to_serde_value(text, &options).map_err(|e| {
        DocumentError::Syntax { position: syntax_error_position(text), message: e.to_string() }
    })?;
    let value = parsed.ok_or(DocumentError::Empty)?;
    let key_ranges = extract_key_ranges(text)?;

    Ok(ParsedDocument { value, key_ranges })
}

/// Parse text with tree-sitter-json.
fn parse_tree(text: &str) -> Result<tree_sitter::Tree, DocumentError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_json::LANGUAGE.into())
        .map_err(|e| DocumentError::Parser(e.to_string()))?;
    parser
        .parse(text, None)
        .ok_or_else(|| DocumentError::Parser("parser returned no tree".to_string()))
}

/// Position of the first syntax error tree-sitter finds, or the start of the document.
fn syntax_error_position(text: &str) -> SourcePosition {
    parse_tree(text)
        .ok()
        .and_then(|tree| first_error(tree.root_node()).map(|node| node.start_position().into()))
        .unwrap_or(SourcePosition { line: 0, character: 0 })
}

/// Find the first error or missing node.
fn first_error(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Extract dot-separated key ranges, rejecting keys repeated within one object.
fn extract_key_ranges(text: &str) -> Result<HashMap<String, SourceRange>, DocumentError> {
    let tree = parse_tree(text)?;
    let mut key_ranges = HashMap::new();
    extract_keys_from_node(tree.root_node(), text.as_bytes(), None, &mut key_ranges)?;
    Ok(key_ranges)
}

/// Recursive part of `extract_key_ranges`.
fn extract_keys_from_node(
    node: tree_sitter::Node<'_>,
    source: &[u8],
    prefix: Option<&str>,
    key_ranges: &mut HashMap<String, SourceRange>,
) -> Result<(), DocumentError> {
    let mut cursor = node.walk();
    match node.kind() {
        "document" => {
            for child in node.named_children(&mut cursor) {
                extract_keys_from_node(child, source, prefix, key_ranges)?;
            }
        }
        "object" => {
            let mut seen = HashSet::new();
            for pair in node.named_children(&mut cursor).filter(|n| n.kind() == "pair") {
                let (Some(key_node), Some(value_node)) =
                    (pair.child_by_field_name("key"), pair.child_by_field_name("value"))
                else {
                    continue;
                };
                let Ok(key_text) = key_node.utf8_text(source) else {
                    tracing::warn!("Failed to get key text from node");
                    continue;
                };
                let key = serde_json::from_str::<String>(key_text)
                    .unwrap_or_else(|_| key_text.trim_matches('"').to_string());

                let full_key = join_path(prefix, &key);
                let key_range = SourceRange::from_node(&key_node);
                if !seen.insert(key) {
                    return Err(DocumentError::DuplicateKey { key: full_key, position: key_range.start });
                }

                key_ranges.insert(full_key.clone(), key_range);
                extract_keys_from_node(value_node, source, Some(&full_key), key_ranges)?;
            }
        }
        _ => {}
    }
    Ok(())
}

impl TranslationFile {
    /// Build a translation file from its text.
    pub fn from_text(path: &Path, location: FileLocation, text: &str) -> Result<Self, LoadError> {
        let parsed = parse_document(text).map_err(|source| match source {
            DocumentError::DuplicateKey { key, .. } => MalformedCatalog::new(
                location.locale.as_str(),
                join_path(location.namespace.as_deref(), &key),
                MalformedReason::DuplicateKey,
            )
            .into(),
            source => LoadError::Document { path: path.to_path_buf(), source },
        })?;

        let key_ranges = match location.namespace.as_deref() {
            Some(namespace) => parsed
                .key_ranges
                .into_iter()
                .map(|(key, range)| (join_path(Some(namespace), &key), range))
                .collect(),
            None => parsed.key_ranges,
        };

        Ok(Self { path: path.to_path_buf(), location, value: parsed.value, key_ranges })
    }
}

/// Load a translation file.
pub async fn load_translation_file(
    file_path: &Path,
    location: FileLocation,
) -> Result<TranslationFile, LoadError> {
    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|source| LoadError::Io { path: file_path.to_path_buf(), source })?;

    tracing::debug!(path = %file_path.display(), locale = %location.locale, "Loaded translation file");
    TranslationFile::from_text(file_path, location, &content)
}
