//! 翻訳カタログ
/// キーパスの解析と解決
mod key_path;
/// ロケール単位のカタログ
mod locale;
/// 名前空間ツリー
mod node;

pub use key_path::{
    InvalidKeyPath,
    KEY_SEPARATOR,
    KeyNotFound,
    KeyPath,
    NotFoundReason,
    resolve_key,
};
pub use locale::{
    LocaleCatalog,
    is_locale_tag,
};
pub(crate) use node::join_path;
pub use node::{
    MalformedCatalog,
    MalformedReason,
    Node,
};
