//! Built-in configuration defaults.

use std::path::PathBuf;

/// Subdirectory of the data dir holding the embedded database.
pub const DEFAULT_DATABASE_DIR: &str = "db";

/// Subdirectory of the data dir holding uploaded assets.
pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// Default data directory: the platform data dir, falling back to a local
/// `.tartib` directory.
pub fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("tartib"))
        .unwrap_or_else(|| PathBuf::from(".tartib"))
        .to_string_lossy()
        .to_string()
}
