//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce `DispatchEngineConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("engine.toml")).unwrap();
//! println!("chunk size: {}", config.batch.chunk_size);
//! ```

mod parser;
mod validator;

pub use contracts::DispatchEngineConfig;
pub use parser::ConfigFormat;

use contracts::DispatchError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<DispatchEngineConfig, DispatchError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<DispatchEngineConfig, DispatchError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Serialize DispatchEngineConfig to TOML string
    pub fn to_toml(config: &DispatchEngineConfig) -> Result<String, DispatchError> {
        toml::to_string_pretty(config)
            .map_err(|e| DispatchError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize DispatchEngineConfig to JSON string
    pub fn to_json(config: &DispatchEngineConfig) -> Result<String, DispatchError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| DispatchError::config_parse(format!("JSON serialize error: {e}")))
    }

    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, DispatchError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            DispatchError::config_parse("cannot determine file format from extension")
        })?;
        ConfigFormat::from_extension(ext).ok_or_else(|| {
            DispatchError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }
}
