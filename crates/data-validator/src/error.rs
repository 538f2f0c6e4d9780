//! Validation Error Types

use thiserror::Error;

/// Errors during payload validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The payload carried no readings at all
    #[error("Payload cannot be empty")]
    EmptyPayload,

    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// NaN or infinite value
    #[error("{field} value is not a finite number")]
    NonFinite { field: &'static str },

    /// Date not in YYYY-MM-DD form
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Request body could not be decoded into readings
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Error attributed to a single reading of the payload
    #[error("reading {index}: {source}")]
    AtReading {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Attach the payload position of the offending reading
    pub fn at(self, index: usize) -> Self {
        ValidationError::AtReading {
            index,
            source: Box::new(self),
        }
    }
}
