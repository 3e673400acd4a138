//! Measura Core - Fundamental types
//!
//! This crate provides the core types used throughout Measura:
//! - `parse_value`: lenient text-to-number parsing for user input
//! - `format_number`: display formatting with trailing zeros stripped
//! - `MeasuraError`: Structured errors for clients of the converter

mod number;
mod error;

pub use number::{parse_value, format_number, format_value, NumberError, DEFAULT_MAX_DECIMALS, MAX_DECIMALS};
pub use error::{MeasuraError, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{parse_value, format_number, format_value, MeasuraError, NumberError};
    pub use crate::error::codes;
}
