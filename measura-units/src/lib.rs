//! Measura Units - Unit registry and conversion engine
//!
//! A fixed table of measurement categories and the pure functions that
//! convert between the units of one category.
//!
//! Categories:
//! - Length (meter, kilometer, mile, foot, ...)
//! - Weight (kilogram, gram, pound, ounce, ...)
//! - Volume (liter, milliliter, US gallon, ...)
//! - Time (second, minute, hour, day, week, ...)
//! - Temperature (Celsius, Fahrenheit, Kelvin)
//!
//! Linear categories scale by a factor relative to a base unit.
//! Temperature is affine and goes through a dedicated routine.

mod unit;
mod temperature;
mod units;
mod convert;

pub use unit::{Unit, LinearUnit, Category, CategoryKind, NonlinearFn, ConversionError};
pub use temperature::convert_temperature;
pub use units::{Registry, RegistryViolation, REGISTRY};
pub use convert::{convert, try_convert, convert_number, rate_text};
