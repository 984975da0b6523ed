use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SproutError};

/// User-level configuration loaded from `~/.config/sprout/config.toml`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// Registry base URL, e.g. `https://registry.npmjs.org/`.
    pub registry: Option<String>,
    /// Search text used when no `--template` is given.
    pub search_keyword: Option<String>,
    /// Maximum number of search results offered for selection.
    pub search_size: Option<usize>,
    /// Where template archives are extracted.
    pub scratch_dir: Option<PathBuf>,
}

/// Get the path to the user config file.
fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sprout").join("config.toml"))
}

/// Load user configuration from the XDG config directory.
///
/// Returns `Ok(None)` if the config file does not exist.
/// Returns `Err` if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<Option<UserConfig>> {
    let path = match config_path() {
        Some(p) => p,
        None => return Ok(None),
    };

    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| SproutError::Io {
        context: format!("reading user config {}", path.display()),
        source: e,
    })?;

    let config: UserConfig =
        toml::from_str(&content).map_err(|e| SproutError::ConfigParse { path, source: e })?;

    Ok(Some(config))
}
