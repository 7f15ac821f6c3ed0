//! View-state template persistence.
//!
//! A template is a flat string-keyed property store; record properties are
//! addressed by ordinal-prefixed keys. The store round-trips through JSON on
//! disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HistoError;

pub const KEY_IS_VISIBLE: &str = "isVisible";
pub const KEY_IS_POSITION_LEFT: &str = "isPositionLeft";
pub const KEY_COLOR: &str = "color";
pub const KEY_LINE_WIDTH: &str = "lineWidth";
pub const KEY_LINE_STYLE: &str = "lineStyle";
pub const KEY_IS_ROUND_OUT: &str = "isRoundOut";
pub const KEY_IS_START_POINT_ZERO: &str = "isStartpointZero";
pub const KEY_NUMBER_FORMAT: &str = "numberFormat";
pub const KEY_IS_START_END_DEFINED: &str = "isStartEndDefined";
pub const KEY_DEFINED_MAX_VALUE: &str = "definedMaxValue";
pub const KEY_DEFINED_MIN_VALUE: &str = "definedMinValue";
pub const KEY_TRAIL_TEXT_ORDINAL: &str = "trailTextOrdinal";
pub const KEY_SMART_STATISTICS: &str = "smartStatistics";
pub const KEY_VALUE_GRID_RECORD_NAME: &str = "valueGridRecordName";

/// Flat property store holding one view configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoTemplate {
    properties: BTreeMap<String, String>,
    /// Free-text comment stored alongside the properties.
    #[serde(default)]
    comment: String,
}

impl HistoTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the template carries any data, e.g. after a load.
    pub fn is_available(&self) -> bool {
        !self.properties.is_empty()
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn property_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.property(key).unwrap_or(default)
    }

    pub fn set_property(&mut self, key: &str, value: impl ToString) {
        self.properties.insert(key.to_string(), value.to_string());
    }

    fn record_key(ordinal: usize, key: &str) -> String {
        format!("{ordinal}_{key}")
    }

    pub fn record_property(&self, ordinal: usize, key: &str) -> Option<&str> {
        self.property(&Self::record_key(ordinal, key))
    }

    pub fn set_record_property(&mut self, ordinal: usize, key: &str, value: impl ToString) {
        self.set_property(&Self::record_key(ordinal, key), value);
    }

    pub fn set_comment(&mut self, comment: &str) {
        self.comment = comment.to_string();
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn load(path: &Path) -> Result<Self, HistoError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn store(&self, path: &Path) -> Result<(), HistoError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
