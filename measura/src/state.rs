//! Converter state and the events that drive it

use serde::{Deserialize, Serialize};
use measura_units::Unit;

/// One entry of a unit drop-down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOption {
    pub id: String,
    pub name: String,
}

impl From<Unit> for UnitOption {
    fn from(unit: Unit) -> Self {
        UnitOption {
            id: unit.id.to_string(),
            name: unit.name.to_string(),
        }
    }
}

/// Everything the converter shows. Owned by the controller; views only
/// receive copies of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    pub category: String,
    /// Options offered in both unit lists
    pub units: Vec<UnitOption>,
    pub source_unit: String,
    pub target_unit: String,
    /// Raw text of the source field, as typed or as written back
    pub source_text: String,
    /// Raw text of the target field
    pub target_text: String,
    pub rate_text: String,
}

/// User interactions delivered by the presentation layer.
///
/// Serialized as `{"event": "source_value_edited", "value": "12"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum Event {
    CategoryChanged(String),
    SourceValueEdited(String),
    SourceUnitChanged(String),
    TargetValueEdited(String),
    TargetUnitChanged(String),
    SwapRequested,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_wire_format() {
        let event: Event = serde_json::from_value(json!({
            "event": "target_value_edited",
            "value": "32.8"
        })).unwrap();
        assert_eq!(event, Event::TargetValueEdited("32.8".into()));

        let swap: Event = serde_json::from_value(json!({ "event": "swap_requested" })).unwrap();
        assert_eq!(swap, Event::SwapRequested);
    }

    #[test]
    fn test_unknown_event_rejected() {
        let result: Result<Event, _> = serde_json::from_value(json!({ "event": "reset" }));
        assert!(result.is_err());
    }
}
