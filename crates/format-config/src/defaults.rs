//! Built-in formatting defaults (national standard thesis layout)
//!
//! Lengths are in centimetres, font sizes in points, spacing before/after
//! in lines and first-line indent in characters. Font names are the names
//! written into documents and are kept as Word expects them.

use docfmt_types::FormatConfig;
use lazy_static::lazy_static;
use serde_json::{json, Map, Value};

lazy_static! {
    static ref DEFAULT_CONFIG: FormatConfig = build_default();
}

fn build_default() -> FormatConfig {
    let sections = [
        (
            "page_settings",
            json!({
                "top_margin": 2.5,
                "bottom_margin": 2.5,
                "left_margin": 3.0,
                "right_margin": 2.5,
                "paper_size": "A4"
            }),
        ),
        (
            "fonts",
            json!({
                "chinese_font": "宋体",
                "english_font": "Times New Roman",
                "title_chinese_font": "黑体",
                "title_english_font": "Times New Roman"
            }),
        ),
        (
            "heading1",
            json!({
                "font_name": "黑体",
                "font_size": 16,
                "bold": true,
                "alignment": "center",
                "space_before": 1,
                "space_after": 1
            }),
        ),
        (
            "heading2",
            json!({
                "font_name": "黑体",
                "font_size": 14,
                "bold": true,
                "alignment": "left",
                "space_before": 0.5,
                "space_after": 0
            }),
        ),
        (
            "heading3",
            json!({
                "font_name": "黑体",
                "font_size": 12,
                "bold": true,
                "alignment": "left",
                "space_before": 0,
                "space_after": 0
            }),
        ),
        (
            "body",
            json!({
                "font_name": "宋体",
                "font_size": 12,
                "line_spacing": 1.5,
                "line_spacing_type": "multiple",
                "first_line_indent": 2
            }),
        ),
        (
            "abstract_title",
            json!({
                "chinese": {
                    "font_name": "黑体",
                    "font_size": 18,
                    "bold": true,
                    "alignment": "center"
                },
                "english": {
                    "font_name": "Times New Roman",
                    "font_size": 18,
                    "bold": true,
                    "alignment": "center"
                }
            }),
        ),
        (
            "abstract_body",
            json!({
                "chinese": {
                    "font_name": "宋体",
                    "font_size": 12,
                    "line_spacing": 1.5
                },
                "english": {
                    "font_name": "Times New Roman",
                    "font_size": 12,
                    "line_spacing": 1.5
                }
            }),
        ),
        (
            "figure_caption",
            json!({
                "font_name": "宋体",
                "font_size": 10.5,
                "alignment": "center"
            }),
        ),
        (
            "header",
            json!({
                "font_name": "宋体",
                "font_size": 9,
                "alignment": "center",
                "content": ""
            }),
        ),
        (
            "footer",
            json!({
                "alignment": "center",
                "page_number_format": "arabic"
            }),
        ),
        (
            "reference",
            json!({
                "title_font_name": "黑体",
                "title_font_size": 16,
                "body_font_name": "宋体",
                "body_font_size": 10.5,
                "number_format": "[{}]"
            }),
        ),
    ];

    let map: Map<String, Value> = sections
        .into_iter()
        .map(|(name, section)| (name.to_string(), section))
        .collect();
    FormatConfig::from(map)
}

/// A fresh copy of the default configuration
pub fn default_config() -> FormatConfig {
    DEFAULT_CONFIG.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_config;
    use docfmt_types::Margin;

    #[test]
    fn test_default_margins() {
        let config = default_config();
        assert_eq!(config.margin(Margin::Top), Some(2.5));
        assert_eq!(config.margin(Margin::Bottom), Some(2.5));
        assert_eq!(config.margin(Margin::Left), Some(3.0));
        assert_eq!(config.margin(Margin::Right), Some(2.5));
    }

    #[test]
    fn test_default_has_every_section() {
        let config = default_config();
        for section in [
            "page_settings",
            "fonts",
            "heading1",
            "heading2",
            "heading3",
            "body",
            "abstract_title",
            "abstract_body",
            "figure_caption",
            "header",
            "footer",
            "reference",
        ] {
            assert!(config.section(section).is_some(), "missing {}", section);
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&default_config()).is_ok());
    }
}
