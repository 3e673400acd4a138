//! Unit and category representation

use std::fmt;
use serde::Serialize;
use thiserror::Error;
use measura_core::{MeasuraError, NumberError};

/// A unit as shown to the user: identifier plus display name
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Unit {
    /// Identifier, unique within its category (e.g. "meter", "gallon_us")
    pub id: &'static str,
    /// Display name (e.g. "Meter", "US Gallon")
    pub name: &'static str,
}

/// A unit of a linear category with its scale relative to the base unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearUnit {
    pub id: &'static str,
    pub name: &'static str,
    /// Multiplier converting one of this unit into base-unit terms
    pub factor: f64,
}

impl LinearUnit {
    pub const fn new(id: &'static str, name: &'static str, factor: f64) -> Self {
        Self { id, name, factor }
    }

    pub fn as_unit(&self) -> Unit {
        Unit { id: self.id, name: self.name }
    }
}

/// Conversion routine of a non-linear category: `(value, from, to)`.
/// Returns `None` for unit identifiers the routine does not know.
pub type NonlinearFn = fn(f64, &str, &str) -> Option<f64>;

/// How the units of a category relate to each other
#[derive(Debug, Clone)]
pub enum CategoryKind {
    /// Proportional units expressed against a base unit
    Linear {
        base_unit: &'static str,
        units: Vec<LinearUnit>,
    },
    /// Units related by a dedicated conversion routine
    Nonlinear {
        units: Vec<Unit>,
        convert: NonlinearFn,
    },
}

/// A family of mutually convertible units
#[derive(Debug, Clone)]
pub struct Category {
    /// Identifier (e.g. "length")
    pub id: &'static str,
    /// Display name (e.g. "Length")
    pub name: &'static str,
    pub kind: CategoryKind,
}

impl Category {
    pub fn linear(
        id: &'static str,
        name: &'static str,
        base_unit: &'static str,
        units: Vec<LinearUnit>,
    ) -> Self {
        Category {
            id,
            name,
            kind: CategoryKind::Linear { base_unit, units },
        }
    }

    pub fn nonlinear(
        id: &'static str,
        name: &'static str,
        units: Vec<Unit>,
        convert: NonlinearFn,
    ) -> Self {
        Category {
            id,
            name,
            kind: CategoryKind::Nonlinear { units, convert },
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self.kind, CategoryKind::Linear { .. })
    }

    /// Units in declaration order
    pub fn units(&self) -> Vec<Unit> {
        match &self.kind {
            CategoryKind::Linear { units, .. } => units.iter().map(LinearUnit::as_unit).collect(),
            CategoryKind::Nonlinear { units, .. } => units.clone(),
        }
    }

    /// Unit identifiers in declaration order
    pub fn unit_ids(&self) -> Vec<&'static str> {
        self.units().into_iter().map(|u| u.id).collect()
    }

    pub fn unit(&self, id: &str) -> Option<Unit> {
        match &self.kind {
            CategoryKind::Linear { units, .. } => {
                units.iter().find(|u| u.id == id).map(LinearUnit::as_unit)
            }
            CategoryKind::Nonlinear { units, .. } => units.iter().find(|u| u.id == id).copied(),
        }
    }

    /// Base-relative factor of a unit; `None` for unknown units and for
    /// non-linear categories
    pub fn factor(&self, id: &str) -> Option<f64> {
        match &self.kind {
            CategoryKind::Linear { units, .. } => {
                units.iter().find(|u| u.id == id).map(|u| u.factor)
            }
            CategoryKind::Nonlinear { .. } => None,
        }
    }

    pub fn base_unit(&self) -> Option<&'static str> {
        match &self.kind {
            CategoryKind::Linear { base_unit, .. } => Some(*base_unit),
            CategoryKind::Nonlinear { .. } => None,
        }
    }

    /// Default (from, to) pair: the first unit, and the second one when it
    /// exists. Single-unit categories convert to themselves.
    pub fn default_selection(&self) -> Option<(&'static str, &'static str)> {
        let ids = self.unit_ids();
        let from = *ids.first()?;
        let to = ids.get(1).copied().unwrap_or(from);
        Some((from, to))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Reasons a conversion yields no result
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("not a number: {0}")]
    Parse(#[from] NumberError),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown unit '{unit}' in category '{category}'")]
    UnknownUnit { category: String, unit: String },
}

impl ConversionError {
    pub(crate) fn unknown_unit(category: &str, unit: &str) -> Self {
        ConversionError::UnknownUnit {
            category: category.to_string(),
            unit: unit.to_string(),
        }
    }
}

impl From<ConversionError> for MeasuraError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::Parse(e) => e.into(),
            ConversionError::UnknownCategory(c) => MeasuraError::unknown_category(&c),
            ConversionError::UnknownUnit { category, unit } => {
                MeasuraError::unknown_unit(&category, &unit)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use measura_core::codes;

    fn distance() -> Category {
        Category::linear("distance", "Distance", "meter", vec![
            LinearUnit::new("meter", "Meter", 1.0),
            LinearUnit::new("kilometer", "Kilometer", 1000.0),
        ])
    }

    fn single() -> Category {
        Category::linear("count", "Count", "each", vec![
            LinearUnit::new("each", "Each", 1.0),
        ])
    }

    #[test]
    fn test_unit_order_preserved() {
        assert_eq!(distance().unit_ids(), vec!["meter", "kilometer"]);
    }

    #[test]
    fn test_unit_lookup() {
        let c = distance();
        assert_eq!(c.unit("kilometer").map(|u| u.name), Some("Kilometer"));
        assert_eq!(c.factor("kilometer"), Some(1000.0));
        assert!(c.unit("mile").is_none());
        assert_eq!(c.base_unit(), Some("meter"));
        assert!(c.is_linear());
    }

    #[test]
    fn test_default_selection() {
        assert_eq!(distance().default_selection(), Some(("meter", "kilometer")));
        assert_eq!(single().default_selection(), Some(("each", "each")));

        let empty = Category::linear("none", "None", "x", vec![]);
        assert_eq!(empty.default_selection(), None);
    }

    #[test]
    fn test_error_mapping() {
        let err: MeasuraError = ConversionError::unknown_unit("length", "furlong").into();
        assert_eq!(err.code, codes::UNKNOWN_UNIT);
        assert!(err.message.contains("furlong"));

        let err: MeasuraError = ConversionError::UnknownCategory("speed".into()).into();
        assert_eq!(err.code, codes::UNKNOWN_CATEGORY);
    }
}
