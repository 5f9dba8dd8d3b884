//! Input Validation
//!
//! Range checking for everything the risk engine consumes: vehicle states,
//! hazard zones, tunables, and whole scenes (exactly one self vehicle).

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, ValidationResult, Validator};
