//! Editor settings: built-in defaults, then an optional TOML file, then
//! command-line flags.
//!
//! ```toml
//! backup = true
//!
//! [icon_sys]
//! offset = 0xC0
//! block_len = 68
//! ```

use std::fs;
use std::path::Path;

use ps2_filetypes::{TitleBlockError, TitleBlockLayout};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Layout(#[from] TitleBlockError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_backup")]
    pub backup: bool,
    #[serde(default)]
    pub icon_sys: TitleBlockLayout,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            backup: Self::default_backup(),
            icon_sys: TitleBlockLayout::default(),
        }
    }
}

/// Values taken from the command line. `None` leaves the file or default
/// value in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigOverrides {
    pub no_backup: bool,
    pub offset: Option<usize>,
    pub block_len: Option<usize>,
}

impl EditorConfig {
    const fn default_backup() -> bool {
        true
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if overrides.no_backup {
            self.backup = false;
        }
        if let Some(offset) = overrides.offset {
            self.icon_sys.offset = offset;
        }
        if let Some(block_len) = overrides.block_len {
            self.icon_sys.block_len = block_len;
        }
    }

    /// Builds the effective configuration and rejects an unusable title
    /// block layout before any file is opened.
    pub fn resolve(
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        config.icon_sys.validate()?;
        Ok(config)
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal integer.
pub fn parse_int(value: &str) -> Result<usize, String> {
    let trimmed = value.trim();
    if let Some(stripped) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return usize::from_str_radix(stripped, 16)
            .map_err(|_| format!("Invalid hexadecimal value: {trimmed}"));
    }

    trimmed
        .parse::<usize>()
        .map_err(|_| format!("Invalid value: {trimmed}"))
}
