//! Temperature conversions
//!
//! Temperature scales are offset from each other, so they cannot share a
//! base-unit factor table. Every conversion pivots through Celsius.

use crate::{Category, Unit};

const KELVIN_OFFSET: f64 = 273.15;

pub(crate) fn category() -> Category {
    Category::nonlinear("temperature", "Temperature", vec![
        Unit { id: "celsius", name: "Celsius (°C)" },
        Unit { id: "fahrenheit", name: "Fahrenheit (°F)" },
        Unit { id: "kelvin", name: "Kelvin (K)" },
    ], convert_temperature)
}

/// Convert a temperature between celsius, fahrenheit and kelvin.
///
/// Identical scales return the value untouched. Unknown scale identifiers
/// yield `None`.
pub fn convert_temperature(value: f64, from: &str, to: &str) -> Option<f64> {
    if from == to {
        return Some(value);
    }
    let celsius = to_celsius(value, from)?;
    from_celsius(celsius, to)
}

fn to_celsius(value: f64, unit: &str) -> Option<f64> {
    match unit {
        "celsius" => Some(value),
        "fahrenheit" => Some((value - 32.0) * (5.0 / 9.0)),
        "kelvin" => Some(value - KELVIN_OFFSET),
        _ => None,
    }
}

fn from_celsius(celsius: f64, unit: &str) -> Option<f64> {
    match unit {
        "celsius" => Some(celsius),
        "fahrenheit" => Some(celsius * (9.0 / 5.0) + 32.0),
        "kelvin" => Some(celsius + KELVIN_OFFSET),
        _ => None,
    }
}
