//! Unit definitions - the built-in category table

use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;
use crate::{Category, CategoryKind, LinearUnit, Unit};
use crate::temperature;

/// Global unit registry
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::builtin);

/// Ways a category table can break the registry's invariants
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryViolation {
    #[error("category '{0}' is declared more than once")]
    DuplicateCategory(String),

    #[error("category '{0}' has no units")]
    EmptyCategory(String),

    #[error("unit '{unit}' is declared more than once in '{category}'")]
    DuplicateUnit { category: String, unit: String },

    #[error("base unit '{unit}' of '{category}' is not one of its units")]
    MissingBaseUnit { category: String, unit: String },

    #[error("base unit '{unit}' of '{category}' has factor {factor}, expected 1")]
    BaseFactorNotOne { category: String, unit: String, factor: f64 },

    #[error("unit '{unit}' of '{category}' has invalid factor {factor}")]
    InvalidFactor { category: String, unit: String, factor: f64 },
}

/// Ordered, read-only table of categories
#[derive(Debug, Clone)]
pub struct Registry {
    categories: Vec<Category>,
}

impl Registry {
    /// Build a registry from an explicit category list (declaration order kept)
    pub fn new(categories: Vec<Category>) -> Self {
        Registry { categories }
    }

    /// The built-in categories: length, weight, volume, time, temperature
    pub fn builtin() -> Self {
        Registry::new(vec![
            length(),
            weight(),
            volume(),
            time(),
            temperature::category(),
        ])
    }

    /// All categories in declaration order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Ordered `(id, name)` pairs for a category's unit lists
    pub fn units(&self, category: &str) -> Option<Vec<Unit>> {
        self.category(category).map(Category::units)
    }

    pub fn unit_name(&self, category: &str, unit: &str) -> Option<&'static str> {
        self.category(category)?.unit(unit).map(|u| u.name)
    }

    pub fn default_selection(&self, category: &str) -> Option<(&'static str, &'static str)> {
        self.category(category)?.default_selection()
    }

    /// Check every table invariant, reporting all violations at once
    pub fn validate(&self) -> Result<(), Vec<RegistryViolation>> {
        let mut violations = Vec::new();
        let mut seen_categories = HashSet::new();

        for category in &self.categories {
            let cat = category.id.to_string();
            if !seen_categories.insert(category.id) {
                violations.push(RegistryViolation::DuplicateCategory(cat.clone()));
            }

            let ids = category.unit_ids();
            if ids.is_empty() {
                violations.push(RegistryViolation::EmptyCategory(cat.clone()));
            }

            let mut seen_units = HashSet::new();
            for id in &ids {
                if !seen_units.insert(*id) {
                    violations.push(RegistryViolation::DuplicateUnit {
                        category: cat.clone(),
                        unit: id.to_string(),
                    });
                }
            }

            if let CategoryKind::Linear { base_unit, units } = &category.kind {
                for unit in units {
                    if !(unit.factor.is_finite() && unit.factor > 0.0) {
                        violations.push(RegistryViolation::InvalidFactor {
                            category: cat.clone(),
                            unit: unit.id.to_string(),
                            factor: unit.factor,
                        });
                    }
                }
                match category.factor(base_unit) {
                    None => violations.push(RegistryViolation::MissingBaseUnit {
                        category: cat.clone(),
                        unit: base_unit.to_string(),
                    }),
                    Some(f) if f != 1.0 => violations.push(RegistryViolation::BaseFactorNotOne {
                        category: cat.clone(),
                        unit: base_unit.to_string(),
                        factor: f,
                    }),
                    Some(_) => {}
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn length() -> Category {
    Category::linear("length", "Length", "meter", vec![
        LinearUnit::new("meter", "Meter", 1.0),
        LinearUnit::new("kilometer", "Kilometer", 1000.0),
        LinearUnit::new("centimeter", "Centimeter", 0.01),
        LinearUnit::new("millimeter", "Millimeter", 0.001),
        LinearUnit::new("mile", "Mile", 1609.34),
        LinearUnit::new("yard", "Yard", 0.9144),
        LinearUnit::new("foot", "Foot", 0.3048),
        LinearUnit::new("inch", "Inch", 0.0254),
    ])
}

fn weight() -> Category {
    Category::linear("weight", "Weight", "kilogram", vec![
        LinearUnit::new("kilogram", "Kilogram", 1.0),
        LinearUnit::new("gram", "Gram", 0.001),
        LinearUnit::new("milligram", "Milligram", 0.000001),
        LinearUnit::new("tonne", "Metric Tonne", 1000.0),
        LinearUnit::new("pound", "Pound", 0.453592),
        LinearUnit::new("ounce", "Ounce", 0.0283495),
    ])
}

fn volume() -> Category {
    Category::linear("volume", "Volume", "liter", vec![
        LinearUnit::new("liter", "Liter", 1.0),
        LinearUnit::new("milliliter", "Milliliter", 0.001),
        LinearUnit::new("cubic_meter", "Cubic Meter", 1000.0),
        LinearUnit::new("gallon_us", "US Gallon", 3.78541),
        LinearUnit::new("pint_us", "US Pint", 0.473176),
        LinearUnit::new("cup_us", "US Cup", 0.236588),
    ])
}

fn time() -> Category {
    Category::linear("time", "Time", "second", vec![
        LinearUnit::new("second", "Second", 1.0),
        LinearUnit::new("millisecond", "Millisecond", 0.001),
        LinearUnit::new("minute", "Minute", 60.0),
        LinearUnit::new("hour", "Hour", 3600.0),
        LinearUnit::new("day", "Day", 86400.0),
        LinearUnit::new("week", "Week", 604800.0),
    ])
}
