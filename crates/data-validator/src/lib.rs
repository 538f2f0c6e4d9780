//! Data Validation
//!
//! Turns raw sensor payloads into validated readings: date parsing, finite
//! checks and physical range checking.

mod error;
mod reading;
mod validator;

pub use error::ValidationError;
pub use reading::{Reading, SensorField, SensorPayload, DATE_FORMAT};
pub use validator::{ValidationConfig, Validator, LENIENT_LIMIT};
