use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::catalog::is_locale_tag;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "fallbackLocales[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// 検証エラーを番号付きで整形する
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSettings {
    pub translation_files: TranslationFilesConfig,

    pub exclude_patterns: Vec<String>,

    /// Locale tried last when resolving a key.
    pub default_locale: String,

    /// Locales tried in order after the requested locale.
    pub fallback_locales: Vec<String>,

    /// Reference locale for parity checks.
    /// If unset, `default_locale` is used.
    pub reference_locale: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationFilesConfig {
    pub file_pattern: String,
}

impl CatalogSettings {
    /// The locale that parity checks compare against.
    #[must_use]
    pub fn reference_locale(&self) -> &str {
        self.reference_locale.as_deref().unwrap_or(&self.default_locale)
    }

    /// # Errors
    /// - Invalid glob pattern
    /// - Empty or invalid locale tag
    /// - Duplicate fallback locale
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.translation_files.file_pattern.is_empty() {
            errors.push(ValidationError::new(
                "translationFiles.filePattern",
                "The pattern cannot be empty. Example: \"**/locales/**/*.json\"",
            ));
        } else if let Err(e) = globset::Glob::new(&self.translation_files.file_pattern) {
            errors.push(ValidationError::new(
                "translationFiles.filePattern",
                format!("Invalid glob pattern '{}': {e}", self.translation_files.file_pattern),
            ));
        }

        for (index, pattern) in self.exclude_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("excludePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        check_locale(&mut errors, "defaultLocale", &self.default_locale);

        for (index, locale) in self.fallback_locales.iter().enumerate() {
            let field_path = format!("fallbackLocales[{index}]");
            check_locale(&mut errors, &field_path, locale);
            if self.fallback_locales.iter().take(index).any(|seen| seen == locale) {
                errors.push(ValidationError::new(
                    field_path,
                    format!("Locale '{locale}' is listed more than once"),
                ));
            }
        }

        if let Some(reference) = &self.reference_locale {
            check_locale(&mut errors, "referenceLocale", reference);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// ロケールタグを検証してエラーを追加する
fn check_locale(errors: &mut Vec<ValidationError>, field_path: &str, locale: &str) {
    if locale.is_empty() {
        errors.push(ValidationError::new(
            field_path,
            "The locale cannot be empty. Example: \"en-US\"",
        ));
    } else if !is_locale_tag(locale) {
        errors.push(ValidationError::new(
            field_path,
            format!("Invalid locale '{locale}'. Example: \"ko-KR\""),
        ));
    }
}

impl Default for TranslationFilesConfig {
    fn default() -> Self {
        Self { file_pattern: "**/{locales,i18n,messages}/**/*.{json,jsonc}".to_string() }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            translation_files: TranslationFilesConfig::default(),
            exclude_patterns: vec!["node_modules/**".to_string()],
            default_locale: "en-US".to_string(),
            fallback_locales: Vec::new(),
            reference_locale: None,
        }
    }
}
