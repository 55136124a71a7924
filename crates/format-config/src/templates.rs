//! Preset templates offered by `GET /api/templates`

use docfmt_types::{FormatConfig, Template, TemplateCatalog};
use serde_json::{json, Value};

use crate::defaults::default_config;

/// Template selected when the client has not chosen one
pub const DEFAULT_TEMPLATE: &str = "GB Standard";

fn overlay(value: Value) -> FormatConfig {
    match value {
        Value::Object(map) => FormatConfig::from(map),
        _ => FormatConfig::new(),
    }
}

fn template(name: &str, config: FormatConfig) -> Template {
    Template {
        name: name.to_string(),
        description: format!("{} format template", name),
        config,
    }
}

/// All presets, each a complete configuration
pub fn preset_templates() -> Vec<Template> {
    let base = default_config();

    let science = base.merged_with(&overlay(json!({
        "body": { "line_spacing": 1.25, "font_size": 12 }
    })));

    let liberal_arts = base.merged_with(&overlay(json!({
        "body": { "line_spacing": 2.0, "font_size": 12 },
        "fonts": {
            "chinese_font": "仿宋",
            "english_font": "Times New Roman",
            "title_chinese_font": "黑体",
            "title_english_font": "Times New Roman"
        }
    })));

    vec![
        template(DEFAULT_TEMPLATE, base),
        template("Science & Engineering", science),
        template("Liberal Arts", liberal_arts),
    ]
}

pub fn template_catalog() -> TemplateCatalog {
    TemplateCatalog {
        templates: preset_templates(),
        default: DEFAULT_TEMPLATE.to_string(),
    }
}
