//! Formatting configuration rules
//!
//! Owns everything the backend knows about a `FormatConfig`: the built-in
//! defaults, the preset templates, range validation and the JSON
//! export/import used for configuration files.

pub mod defaults;
pub mod interchange;
pub mod templates;
pub mod validate;

use docfmt_types::FormatConfig;

pub use defaults::default_config;
pub use interchange::{export_config, import_config};
pub use templates::{preset_templates, template_catalog, DEFAULT_TEMPLATE};
pub use validate::{validate_config, ConfigError};

/// Custom settings deep-merged on top of the defaults
pub fn merge_with_defaults(custom: Option<&FormatConfig>) -> FormatConfig {
    let mut merged = default_config();
    if let Some(custom) = custom {
        merged.merge(custom);
    }
    merged
}

/// Merge onto the defaults, then validate the result
pub fn resolve_config(custom: Option<&FormatConfig>) -> Result<FormatConfig, ConfigError> {
    let merged = merge_with_defaults(custom);
    validate_config(&merged)?;
    Ok(merged)
}
