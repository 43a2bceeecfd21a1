//! Shell configuration loaded from YAML or JSON.
//!
//! # Example YAML
//!
//! ```yaml
//! name: inventory
//! prompt: "inv> "
//! banner: ""
//! default_commands: true
//! default_sub_commands: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Prompt used when none is configured.
pub const DEFAULT_PROMPT: &str = "> ";

/// Banner used when none is configured.
pub const DEFAULT_BANNER: &str = "Welcome to the shell. Type \"help\" for available commands.";

/// Presentation and default-command settings for an [`App`](crate::App).
///
/// Every field is optional in the file; missing ones take their defaults.
///
/// # Examples
///
/// ```
/// use shellkit_core::ShellConfig;
///
/// let config = ShellConfig::from_yaml_str("prompt: \"$ \"\ndefault_commands: false\n").unwrap();
/// assert_eq!(config.prompt, "$ ");
/// assert!(!config.default_commands);
/// assert!(config.default_sub_commands);
/// assert!(config.name.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Application name; the builder's name is kept when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Prompt written before each line.
    pub prompt: String,
    /// Banner printed when the read-loop starts. Empty disables it.
    pub banner: String,
    /// Register `exit` and `help`.
    pub default_commands: bool,
    /// Inject `commands`, `flags` and `help` into commands with sub-commands.
    pub default_sub_commands: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            name: None,
            prompt: DEFAULT_PROMPT.to_string(),
            banner: DEFAULT_BANNER.to_string(),
            default_commands: true,
            default_sub_commands: true,
        }
    }
}

impl ShellConfig {
    /// Loads configuration from a file. Files ending in `.json` are parsed
    /// as JSON, everything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or a parse
    /// error for malformed content.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let config = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        Ok(config)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] for malformed content.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Saves the configuration, using the same format rule as [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be written, or a
    /// serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
