//! Everything one user has done so far
//!
//! A session starts empty, gets its fields replaced by successful flows and
//! is cleared when the user removes the uploaded file. Flows borrow it
//! mutably, so no two flows can run on the same session at once.

use docfmt_types::{CheckReport, FormatConfig, FormatResult, Margin, Template};

use crate::upload::LocalFile;

/// Page margins typed by the user, in centimetres
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarginOverrides {
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
}

impl MarginOverrides {
    pub fn get(&self, side: Margin) -> Option<f64> {
        match side {
            Margin::Top => self.top,
            Margin::Bottom => self.bottom,
            Margin::Left => self.left,
            Margin::Right => self.right,
        }
    }

    pub fn set(&mut self, side: Margin, cm: Option<f64>) {
        let slot = match side {
            Margin::Top => &mut self.top,
            Margin::Bottom => &mut self.bottom,
            Margin::Left => &mut self.left,
            Margin::Right => &mut self.right,
        };
        *slot = cm;
    }

    pub fn is_empty(&self) -> bool {
        Margin::ALL.iter().all(|side| self.get(*side).is_none())
    }

    /// `config` with every present override written into `page_settings`
    pub fn apply(&self, config: &FormatConfig) -> FormatConfig {
        let mut effective = config.clone();
        for side in Margin::ALL {
            if let Some(cm) = self.get(side) {
                effective.set_margin(side, cm);
            }
        }
        effective
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub file: Option<LocalFile>,
    pub file_id: Option<String>,
    pub report: Option<CheckReport>,
    pub formatted: Option<FormatResult>,
    /// Configuration of the selected template or the last import
    pub config: FormatConfig,
    pub margins: MarginOverrides,
    pub templates: Vec<Template>,
    pub default_template: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and format need a stored upload
    pub fn has_document(&self) -> bool {
        self.file_id.is_some()
    }

    pub fn can_download(&self) -> bool {
        self.formatted.is_some()
    }

    /// Active configuration with the margin overrides applied
    pub fn effective_config(&self) -> FormatConfig {
        self.margins.apply(&self.config)
    }

    /// Back to the empty-upload state; configuration and templates stay
    pub fn clear_file(&mut self) {
        self.file = None;
        self.file_id = None;
        self.report = None;
        self.formatted = None;
    }

    pub fn find_template(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|template| template.name == name)
    }

    /// Make the named template's configuration active
    pub fn select_template(&mut self, name: &str) -> bool {
        let Some(config) = self.find_template(name).map(|t| t.config.clone()) else {
            return false;
        };
        self.config = config;
        true
    }
}
