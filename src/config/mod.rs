//! Configuration tiers and resolution
//!
//! Values are resolved through three tiers, highest precedence first:
//! 1. Record (`<dataset>.gpd`)
//! 2. Session (`<process-dir>/config.session`)
//! 3. Global (`~/.config/geopublish/config.default`)

mod context;
mod flat;
mod keys;
mod resolver;
mod tier;

pub use context::{default_global_config_path, CatalogConnection, ContextError, RunContext, REDACTED};
pub use flat::{FlatFileError, KeyValues, SEPARATOR};
pub use keys::{ConfigKey, UnknownKey};
pub use resolver::{apply_edit, edit_with_current, ConfigResolver, APPEND_SENTINEL};
pub use tier::{session_path, ConfigTier, TierKind, GLOBAL_FILE_NAME, SESSION_FILE_NAME};
