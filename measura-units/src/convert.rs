//! Conversion engine
//!
//! Pure functions over the registry. Failures come back as values
//! (`Result` / `Option`), never as panics.

use measura_core::{format_number, parse_value};
use crate::{CategoryKind, ConversionError, Registry, REGISTRY};

impl Registry {
    /// Convert an already-parsed value from one unit to another.
    ///
    /// Identical units return `value` exactly, without looking anything up,
    /// so even an unknown unit converts to itself.
    pub fn convert_number(
        &self,
        value: f64,
        from: &str,
        to: &str,
        category: &str,
    ) -> Result<f64, ConversionError> {
        if from == to {
            return Ok(value);
        }

        let cat = self
            .category(category)
            .ok_or_else(|| ConversionError::UnknownCategory(category.to_string()))?;

        match &cat.kind {
            CategoryKind::Linear { base_unit, .. } => {
                let from_factor = cat
                    .factor(from)
                    .ok_or_else(|| ConversionError::unknown_unit(category, from))?;
                let to_factor = cat
                    .factor(to)
                    .ok_or_else(|| ConversionError::unknown_unit(category, to))?;
                let base_factor = cat
                    .factor(base_unit)
                    .ok_or_else(|| ConversionError::unknown_unit(category, base_unit))?;

                // Through the base unit and back out again
                let in_base = value * from_factor / base_factor;
                Ok(in_base * base_factor / to_factor)
            }
            CategoryKind::Nonlinear { units, convert } => {
                for id in [from, to] {
                    if !units.iter().any(|u| u.id == id) {
                        return Err(ConversionError::unknown_unit(category, id));
                    }
                }
                convert(value, from, to).ok_or_else(|| ConversionError::unknown_unit(category, from))
            }
        }
    }

    /// Parse `value` and convert it
    pub fn try_convert(
        &self,
        value: &str,
        from: &str,
        to: &str,
        category: &str,
    ) -> Result<f64, ConversionError> {
        let number = parse_value(value)?;
        self.convert_number(number, from, to, category)
    }

    /// Display name of a unit, falling back to its identifier
    pub fn display_name<'a>(&self, category: &str, unit: &'a str) -> &'a str {
        self.unit_name(category, unit).unwrap_or(unit)
    }

    /// Human-readable rate, e.g. `"1 Meter = 3.28084 Foot"`.
    ///
    /// Equal units always read `"1 X = 1 X"`. A failed conversion gives the
    /// empty string.
    pub fn rate_text(&self, from: &str, to: &str, category: &str, max_decimals: usize) -> String {
        let from_name = self.display_name(category, from);
        let to_name = self.display_name(category, to);

        if from == to {
            return format!("1 {} = 1 {}", from_name, to_name);
        }

        match self.convert_number(1.0, from, to, category) {
            Ok(rate) => format!(
                "1 {} = {} {}",
                from_name,
                format_number(Some(rate), max_decimals),
                to_name
            ),
            Err(_) => String::new(),
        }
    }
}

/// Parse and convert against the built-in registry
pub fn try_convert(value: &str, from: &str, to: &str, category: &str) -> Result<f64, ConversionError> {
    REGISTRY.try_convert(value, from, to, category)
}

/// Parse and convert against the built-in registry; `None` means no result
pub fn convert(value: &str, from: &str, to: &str, category: &str) -> Option<f64> {
    try_convert(value, from, to, category).ok()
}

/// Convert a number against the built-in registry
pub fn convert_number(value: f64, from: &str, to: &str, category: &str) -> Option<f64> {
    REGISTRY.convert_number(value, from, to, category).ok()
}

/// Rate text against the built-in registry
pub fn rate_text(from: &str, to: &str, category: &str, max_decimals: usize) -> String {
    REGISTRY.rate_text(from, to, category, max_decimals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use measura_core::{NumberError, DEFAULT_MAX_DECIMALS};

    const SAMPLES: [f64; 5] = [0.5, 1.0, 3.0, 42.0, 1234.5678];

    fn close(a: f64, b: f64) -> bool {
        let scale = a.abs().max(b.abs()).max(1.0);
        (a - b).abs() <= 1e-9 * scale
    }

    fn linear_categories() -> Vec<(&'static str, Vec<&'static str>)> {
        REGISTRY
            .categories()
            .iter()
            .filter(|c| c.is_linear())
            .map(|c| (c.id, c.unit_ids()))
            .collect()
    }

    #[test]
    fn test_convert_length() {
        assert_eq!(convert("1", "meter", "centimeter", "length"), Some(100.0));
        let miles = convert("1609.34", "meter", "mile", "length").unwrap();
        assert!((miles - 1.0).abs() < 1e-4);
        let km = convert("5000", "meter", "kilometer", "length").unwrap();
        assert!(close(km, 5.0));
    }

    #[test]
    fn test_convert_temperature() {
        assert_eq!(convert("0", "celsius", "fahrenheit", "temperature"), Some(32.0));
        assert_eq!(convert("100", "celsius", "kelvin", "temperature"), Some(373.15));
        assert_eq!(convert("32", "fahrenheit", "celsius", "temperature"), Some(0.0));
    }

    #[test]
    fn test_identity_is_exact() {
        for x in [0.1, 1.0 / 3.0, -7.25, 1e-12, 9.87654321e15] {
            let text = x.to_string();
            assert_eq!(convert(&text, "foot", "foot", "length"), Some(x));
            assert_eq!(convert(&text, "kelvin", "kelvin", "temperature"), Some(x));
        }
    }

    #[test]
    fn test_identity_needs_no_registry() {
        assert_eq!(convert("2.5", "parsec", "parsec", "astronomy"), Some(2.5));
        assert_eq!(convert("2.5", "furlong", "furlong", "length"), Some(2.5));
    }

    #[test]
    fn test_transitivity() {
        for (category, units) in linear_categories() {
            for &u in &units {
                for &v in &units {
                    for &w in &units {
                        for x in SAMPLES {
                            let uv = convert_number(x, u, v, category).unwrap();
                            let chained = convert_number(uv, v, w, category).unwrap();
                            let direct = convert_number(x, u, w, category).unwrap();
                            assert!(close(chained, direct),
                                "{}: {} {} -> {} -> {} gave {} vs {}", category, x, u, v, w, chained, direct);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_round_trip() {
        for category in REGISTRY.categories() {
            let units = category.unit_ids();
            for &u in &units {
                for &v in &units {
                    for x in SAMPLES {
                        let there = convert_number(x, u, v, category.id).unwrap();
                        let back = convert_number(there, v, u, category.id).unwrap();
                        assert!(close(back, x), "{}: {} {} <-> {} gave {}", category.id, x, u, v, back);
                    }
                }
            }
        }
    }

    #[test]
    fn test_failures_are_values() {
        assert!(matches!(try_convert("", "meter", "foot", "length"),
            Err(ConversionError::Parse(NumberError::Parse(_)))));
        assert!(matches!(try_convert("abc", "meter", "meter", "length"),
            Err(ConversionError::Parse(_))));
        assert_eq!(try_convert("1", "meter", "foot", "speed"),
            Err(ConversionError::UnknownCategory("speed".into())));
        assert_eq!(try_convert("1", "meter", "furlong", "length"),
            Err(ConversionError::UnknownUnit { category: "length".into(), unit: "furlong".into() }));
        assert_eq!(try_convert("1", "rankine", "celsius", "temperature"),
            Err(ConversionError::UnknownUnit { category: "temperature".into(), unit: "rankine".into() }));
        // A unit from another category is unknown here
        assert!(convert("1", "meter", "celsius", "temperature").is_none());
    }

    #[test]
    fn test_rate_text() {
        assert_eq!(rate_text("meter", "centimeter", "length", DEFAULT_MAX_DECIMALS),
            "1 Meter = 100 Centimeter");
        assert_eq!(rate_text("meter", "foot", "length", DEFAULT_MAX_DECIMALS),
            "1 Meter = 3.28084 Foot");
        assert_eq!(rate_text("celsius", "fahrenheit", "temperature", DEFAULT_MAX_DECIMALS),
            "1 Celsius (°C) = 33.8 Fahrenheit (°F)");
    }

    #[test]
    fn test_rate_text_equal_units() {
        assert_eq!(rate_text("liter", "liter", "volume", DEFAULT_MAX_DECIMALS), "1 Liter = 1 Liter");
        // Unknown but equal units fall back to the identifier
        assert_eq!(rate_text("furlong", "furlong", "length", DEFAULT_MAX_DECIMALS),
            "1 furlong = 1 furlong");
    }

    #[test]
    fn test_rate_text_failure_is_empty() {
        assert_eq!(rate_text("meter", "furlong", "length", DEFAULT_MAX_DECIMALS), "");
        assert_eq!(rate_text("meter", "foot", "speed", DEFAULT_MAX_DECIMALS), "");
    }
}
