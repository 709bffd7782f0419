//! Compiler configuration, loaded from the `[compiler]` table of `kestrel.toml`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Name of the configuration file looked up by the CLI
pub const CONFIG_FILE_NAME: &str = "kestrel.toml";

/// Globals of the usual browser and node hosts
pub const DEFAULT_HOST_GLOBALS: &[&str] = &["jQuery", "window", "document", "process", "global"];

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompilerConfig {
    /// Run the IR inliner and the inlining-aware renderer
    pub inline: bool,

    /// Emit call-stack context instrumentation
    pub context: bool,

    /// Unknown identifiers accepted as free globals
    pub host_globals: Vec<String>,

    /// Names the default global resolver reports as defined
    pub known_globals: Vec<String>,

    /// JS identifier of the runtime object
    pub runtime: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            inline: true,
            context: true,
            host_globals: DEFAULT_HOST_GLOBALS.iter().map(|s| s.to_string()).collect(),
            known_globals: Vec::new(),
            runtime: "smalltalk".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    compiler: CompilerConfig,
}

impl CompilerConfig {
    /// Parse the `[compiler]` table out of a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        file.compiler.validate()?;
        Ok(file.compiler)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn is_host_global(&self, name: &str) -> bool {
        self.host_globals.iter().any(|g| g == name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut chars = self.runtime.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_' || first == '$')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.')
            }
            None => false,
        };
        if !valid {
            return Err(ConfigError::Invalid(format!(
                "runtime '{}' is not a JavaScript identifier",
                self.runtime
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert!(config.inline);
        assert!(config.context);
        assert_eq!(config.runtime, "smalltalk");
        assert!(config.is_host_global("window"));
        assert!(!config.is_host_global("zork"));
    }

    #[test]
    fn test_partial_table() {
        let config = CompilerConfig::from_toml_str(
            r#"
            [compiler]
            inline = false
            known-globals = ["Smalltalk"]
            "#,
        )
        .unwrap();
        assert!(!config.inline);
        assert!(config.context);
        assert_eq!(config.known_globals, vec!["Smalltalk"]);
        assert_eq!(config.host_globals.len(), DEFAULT_HOST_GLOBALS.len());
    }

    #[test]
    fn test_missing_table_uses_defaults() {
        let config = CompilerConfig::from_toml_str("[package]\nname = \"x\"\n").unwrap();
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn test_rejects_bad_runtime() {
        let err = CompilerConfig::from_toml_str("[compiler]\nruntime = \"9lives\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[compiler]\nruntime = \"amber\"\nhost-globals = []").unwrap();

        let config = CompilerConfig::load(file.path()).unwrap();
        assert_eq!(config.runtime, "amber");
        assert!(config.host_globals.is_empty());
    }
}
