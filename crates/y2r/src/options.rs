//! Translation options and the `y2r.toml` configuration file.

use serde::Deserialize;
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "y2r.toml";

/// Knobs that change the generated code.
///
/// ```toml
/// # y2r.toml
/// export_private = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Publish non-global module symbols too, marked `:private => true`.
    pub export_private: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

impl Options {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load options from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Toml {
            path: display,
            source,
        })
    }

    /// Load options from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        assert_eq!(Options::from_toml("").unwrap(), Options::default());
    }

    #[test]
    fn test_export_private() {
        let options = Options::from_toml("export_private = true").unwrap();
        assert!(options.export_private);
    }

    #[test]
    fn test_unknown_key() {
        assert!(Options::from_toml("export_privat = true").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let options = Options::load_or_default(Path::new("/nonexistent/y2r.toml")).unwrap();
        assert_eq!(options, Options::default());
    }
}
