//! Configuration files: canonical export and validated import

use docfmt_types::FormatConfig;

use crate::validate::{validate_config, ConfigError};
use crate::merge_with_defaults;

/// Pretty-printed JSON, non-ASCII text kept as-is
pub fn export_config(config: &FormatConfig) -> Result<String, ConfigError> {
    serde_json::to_string_pretty(config).map_err(ConfigError::Encode)
}

/// Parse a configuration file, validate it and complete it with defaults
pub fn import_config(json: &str) -> Result<FormatConfig, ConfigError> {
    let config: FormatConfig = serde_json::from_str(json).map_err(ConfigError::Parse)?;
    validate_config(&config)?;
    Ok(merge_with_defaults(Some(&config)))
}
