//! Presentation side of the converter
//!
//! The controller writes through `View`; it never reads from it. Input
//! reaches the controller only as `Event`s.

use serde::Serialize;
use crate::UnitOption;

/// Output fields of the converter
pub trait View {
    /// Repopulate both unit lists
    fn show_units(&mut self, units: &[UnitOption]);
    /// Select a unit in each list
    fn show_selection(&mut self, source_unit: &str, target_unit: &str);
    fn show_source_text(&mut self, text: &str);
    fn show_target_text(&mut self, text: &str);
    fn show_rate_text(&mut self, text: &str);
}

/// View that discards every write
pub struct NullView;

impl View for NullView {
    fn show_units(&mut self, _units: &[UnitOption]) {}
    fn show_selection(&mut self, _source_unit: &str, _target_unit: &str) {}
    fn show_source_text(&mut self, _text: &str) {}
    fn show_target_text(&mut self, _text: &str) {}
    fn show_rate_text(&mut self, _text: &str) {}
}

/// Collects the fields written while handling one event.
/// Fields never written stay `None`; repeated writes keep the last value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<Vec<UnitOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_text: Option<String>,
}

impl FieldUpdates {
    pub fn new() -> Self {
        Self::default()
    }
}

impl View for FieldUpdates {
    fn show_units(&mut self, units: &[UnitOption]) {
        self.units = Some(units.to_vec());
    }

    fn show_selection(&mut self, source_unit: &str, target_unit: &str) {
        self.source_unit = Some(source_unit.to_string());
        self.target_unit = Some(target_unit.to_string());
    }

    fn show_source_text(&mut self, text: &str) {
        self.source_text = Some(text.to_string());
    }

    fn show_target_text(&mut self, text: &str) {
        self.target_text = Some(text.to_string());
    }

    fn show_rate_text(&mut self, text: &str) {
        self.rate_text = Some(text.to_string());
    }
}
