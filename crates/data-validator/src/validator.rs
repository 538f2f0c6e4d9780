//! Payload Validator for Range Checking

use crate::error::ValidationError;
use crate::reading::{Reading, SensorField, SensorPayload, DATE_FORMAT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Magnitude bound of the lenient preset
pub const LENIENT_LIMIT: f64 = 1e100;

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Air temperature valid range (°C)
    pub temperature_range: (f64, f64),
    /// Relative humidity valid range (%)
    pub humidity_range: (f64, f64),
    /// TDS valid range (ppm)
    pub tds_range: (f64, f64),
    /// pH valid range
    pub ph_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            temperature_range: (-50.0, 80.0),
            humidity_range: (0.0, 100.0),
            tds_range: (0.0, 10_000.0),
            ph_range: (0.0, 14.0),
        }
    }
}

impl ValidationConfig {
    /// Ranges plausible for a hydroponic greenhouse
    pub fn strict() -> Self {
        Self {
            temperature_range: (0.0, 50.0),
            tds_range: (0.0, 5_000.0),
            ph_range: (3.0, 10.0),
            ..Default::default()
        }
    }

    /// Widest ranges; values stay small enough that expanding sums remain finite
    pub fn lenient() -> Self {
        let open = (-LENIENT_LIMIT, LENIENT_LIMIT);
        Self {
            temperature_range: open,
            humidity_range: open,
            tds_range: open,
            ph_range: open,
        }
    }

    /// Range configured for a field
    pub fn range(&self, field: SensorField) -> (f64, f64) {
        match field {
            SensorField::Temperature => self.temperature_range,
            SensorField::Humidity => self.humidity_range,
            SensorField::Tds => self.tds_range,
            SensorField::Ph => self.ph_range,
        }
    }
}

/// Validator for incoming sensor payloads
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate one numeric field of a payload
    pub fn validate_field(&self, field: SensorField, value: f64) -> Result<(), ValidationError> {
        self.validate_range(field.as_str(), value, self.config.range(field))
    }

    /// Parse a `YYYY-MM-DD` date
    pub fn parse_date(&self, raw: &str) -> Result<NaiveDate, ValidationError> {
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
            .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
    }

    /// Validate a single payload entry into a reading
    pub fn validate_reading(&self, payload: &SensorPayload) -> Result<Reading, ValidationError> {
        let date = self.parse_date(&payload.date)?;
        for field in SensorField::ALL {
            self.validate_field(field, payload.value(field))?;
        }

        Ok(Reading {
            date,
            temperature: payload.temperature,
            humidity: payload.humidity,
            tds: payload.tds,
            ph: payload.ph,
            growth_days: payload.growth_days,
        })
    }

    /// Validate a whole payload; the first failing reading is reported with its index
    pub fn validate_payload(&self, payload: &[SensorPayload]) -> Result<Vec<Reading>, ValidationError> {
        if payload.is_empty() {
            return Err(ValidationError::EmptyPayload);
        }

        let readings = payload
            .iter()
            .enumerate()
            .map(|(i, p)| self.validate_reading(p).map_err(|e| e.at(i)))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Validated {} readings", readings.len());
        Ok(readings)
    }
}
