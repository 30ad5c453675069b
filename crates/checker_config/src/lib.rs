//! Audit configuration files (YAML/TOML formats).
//!
//! This crate loads an [`AuditContext`] from a configuration file. Every key is
//! optional; missing keys keep their defaults and unknown keys are rejected.
//!
//! # Example
//!
//! ```rust
//! use checker_config::parse_yaml;
//! use checker_core::SizeStrategy;
//!
//! let yaml = r#"
//! check_element_sizes: true
//! batch_size: 4096
//! strategy: push-down
//! "#;
//!
//! let ctx = parse_yaml(yaml).expect("Failed to parse config");
//! assert!(ctx.check_element_sizes);
//! assert_eq!(ctx.batch_size, 4096);
//! assert_eq!(ctx.strategy, SizeStrategy::PushDown);
//! assert_eq!(ctx.size_limit_kb, 126.0);
//! ```

use checker_core::AuditContext;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// A value parsed but is out of range
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

/// Parse an audit configuration from a YAML string.
pub fn parse_yaml(content: &str) -> Result<AuditContext> {
    // An empty document deserializes to unit, not a map.
    if content.trim().is_empty() {
        return Ok(AuditContext::default());
    }
    let ctx: AuditContext = serde_yaml_ng::from_str(content)?;
    validate(ctx)
}

/// Parse an audit configuration from a TOML string.
///
/// # Example
///
/// ```rust
/// use checker_config::parse_toml;
///
/// let toml = r#"
/// size_limit_kb = 64.0
/// highlight = false
/// "#;
///
/// let ctx = parse_toml(toml).unwrap();
/// assert_eq!(ctx.size_limit_kb, 64.0);
/// assert!(!ctx.highlight);
/// ```
pub fn parse_toml(content: &str) -> Result<AuditContext> {
    let ctx: AuditContext =
        toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
    validate(ctx)
}

/// Detect the configuration format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `ConfigFormat::Yaml`
/// * `.toml` → `ConfigFormat::Toml`
pub fn detect_format(path: &Path) -> Result<ConfigFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ConfigError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(ConfigFormat::Yaml),
        "toml" => Ok(ConfigFormat::Toml),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse an audit configuration from a file with automatic format detection.
pub fn parse_file(path: &Path) -> Result<AuditContext> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        ConfigFormat::Yaml => parse_yaml(&content),
        ConfigFormat::Toml => parse_toml(&content),
    }
}

fn validate(ctx: AuditContext) -> Result<AuditContext> {
    if ctx.batch_size == 0 {
        return Err(ConfigError::InvalidValue {
            key: "batch_size".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    if !ctx.size_limit_kb.is_finite() || ctx.size_limit_kb < 0.0 {
        return Err(ConfigError::InvalidValue {
            key: "size_limit_kb".to_string(),
            message: format!("must be a non-negative number, got {}", ctx.size_limit_kb),
        });
    }

    Ok(ctx)
}
