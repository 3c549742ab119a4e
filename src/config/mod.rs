//! `.i18n-catalog.json` の設定
/// Config file loader
mod loader;
/// Configuration manager
mod manager;
/// Configuration types and settings
mod types;

pub use manager::ConfigManager;
pub use types::{
    CatalogSettings,
    ConfigError,
    TranslationFilesConfig,
    ValidationError,
};
