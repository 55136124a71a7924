//! Range checks on a formatting configuration
//!
//! Only values that are present are checked. Each rule returns the first
//! problem it finds.

use docfmt_types::config::PAGE_SETTINGS;
use docfmt_types::{FormatConfig, Margin};
use serde_json::{Map, Value};
use thiserror::Error;

/// Largest accepted page margin in centimetres
pub const MAX_MARGIN_CM: f64 = 10.0;

/// Largest accepted font size in points
pub const MAX_FONT_SIZE_PT: f64 = 72.0;

/// Sections whose `font_size` is range-checked
pub const SIZED_SECTIONS: [&str; 5] = ["heading1", "heading2", "heading3", "body", "figure_caption"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("page margin {key} must be between 0 and 10 cm")]
    InvalidMargin { key: &'static str },

    #[error("{section} font size must be between 0 and 72 pt")]
    InvalidFontSize { section: &'static str },

    #[error("line spacing must be greater than 0")]
    InvalidLineSpacing,

    #[error("first-line indent must be at least 0")]
    InvalidIndent,

    #[error("section {0} must be an object")]
    MalformedSection(&'static str),

    #[error("JSON parse failed: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to encode config: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Validate every known rule, stopping at the first failure
pub fn validate_config(config: &FormatConfig) -> Result<(), ConfigError> {
    check_page_margins(config)?;
    check_font_sizes(config)?;
    check_body_spacing(config)?;
    Ok(())
}

fn section<'a>(
    config: &'a FormatConfig,
    name: &'static str,
) -> Result<Option<&'a Map<String, Value>>, ConfigError> {
    match config.as_map().get(name) {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(ConfigError::MalformedSection(name)),
    }
}

/// Present values that are not numbers fail the check
fn number_in(map: &Map<String, Value>, key: &str, accept: impl Fn(f64) -> bool) -> bool {
    match map.get(key) {
        None => true,
        Some(value) => value.as_f64().is_some_and(accept),
    }
}

fn check_page_margins(config: &FormatConfig) -> Result<(), ConfigError> {
    let Some(page) = section(config, PAGE_SETTINGS)? else {
        return Ok(());
    };

    for side in Margin::ALL {
        if !number_in(page, side.key(), |cm| cm > 0.0 && cm <= MAX_MARGIN_CM) {
            return Err(ConfigError::InvalidMargin { key: side.key() });
        }
    }
    Ok(())
}

fn check_font_sizes(config: &FormatConfig) -> Result<(), ConfigError> {
    for name in SIZED_SECTIONS {
        let Some(map) = section(config, name)? else {
            continue;
        };
        if !number_in(map, "font_size", |pt| pt > 0.0 && pt <= MAX_FONT_SIZE_PT) {
            return Err(ConfigError::InvalidFontSize { section: name });
        }
    }
    Ok(())
}

fn check_body_spacing(config: &FormatConfig) -> Result<(), ConfigError> {
    let Some(body) = section(config, "body")? else {
        return Ok(());
    };

    if !number_in(body, "line_spacing", |spacing| spacing > 0.0) {
        return Err(ConfigError::InvalidLineSpacing);
    }
    if !number_in(body, "first_line_indent", |indent| indent >= 0.0) {
        return Err(ConfigError::InvalidIndent);
    }
    Ok(())
}
