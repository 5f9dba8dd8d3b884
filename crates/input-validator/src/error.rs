//! Validation Error Types

use thiserror::Error;

/// Errors during input validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// NaN or infinite input
    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },

    /// Scene without a self vehicle
    #[error("Scene has no self vehicle")]
    MissingSelf,

    /// Scene with more than one self vehicle
    #[error("Scene has {0} self vehicles, expected exactly one")]
    DuplicateSelf(usize),

    /// Hazard zone with a zero or negative radius
    #[error("Hazard zone {id} has non-positive radius {radius_m}")]
    NonPositiveRadius { id: String, radius_m: f64 },
}
