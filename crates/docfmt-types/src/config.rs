//! Formatting configuration as exchanged over the wire
//!
//! The client treats a configuration as an opaque JSON object. The only
//! structure it relies on is the `page_settings` section holding the four
//! page margins (in centimetres).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Section holding page margins and paper size
pub const PAGE_SETTINGS: &str = "page_settings";

/// Formatting options keyed by section (`page_settings`, `body`, `heading1`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatConfig(Map<String, Value>);

/// One of the four page margins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Margin {
    Top,
    Bottom,
    Left,
    Right,
}

impl Margin {
    pub const ALL: [Margin; 4] = [Margin::Top, Margin::Bottom, Margin::Left, Margin::Right];

    /// Key of this margin inside `page_settings`
    pub fn key(self) -> &'static str {
        match self {
            Margin::Top => "top_margin",
            Margin::Bottom => "bottom_margin",
            Margin::Left => "left_margin",
            Margin::Right => "right_margin",
        }
    }
}

impl std::fmt::Display for Margin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FormatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A section of the configuration, if present and an object
    pub fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.0.get(name).and_then(Value::as_object)
    }

    pub fn page_settings(&self) -> Option<&Map<String, Value>> {
        self.section(PAGE_SETTINGS)
    }

    /// Margin in centimetres, if set to a number
    pub fn margin(&self, side: Margin) -> Option<f64> {
        self.page_settings()
            .and_then(|page| page.get(side.key()))
            .and_then(Value::as_f64)
    }

    /// Set a margin, creating `page_settings` when it is missing
    pub fn set_margin(&mut self, side: Margin, cm: f64) {
        let entry = self
            .0
            .entry(PAGE_SETTINGS.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }

        if let Value::Object(page) = entry {
            page.insert(side.key().to_string(), Value::from(cm));
        }
    }

    /// Deep-merge `overlay` into this configuration.
    ///
    /// Objects present on both sides are merged key by key; any other
    /// overlay value replaces the existing one.
    pub fn merge(&mut self, overlay: &FormatConfig) {
        deep_merge(&mut self.0, &overlay.0);
    }

    /// `overlay` merged on top of a copy of `self`
    pub fn merged_with(&self, overlay: &FormatConfig) -> FormatConfig {
        let mut merged = self.clone();
        merged.merge(overlay);
        merged
    }
}

impl From<Map<String, Value>> for FormatConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<FormatConfig> for Value {
    fn from(config: FormatConfig) -> Self {
        Value::Object(config.0)
    }
}

fn deep_merge(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        if let (Some(Value::Object(existing)), Value::Object(incoming)) = (base.get_mut(key), value)
        {
            deep_merge(existing, incoming);
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}
