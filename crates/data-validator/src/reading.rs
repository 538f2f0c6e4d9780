//! Sensor Reading Types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire format of dates in payloads
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw reading as received from the request layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorPayload {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Air temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Total dissolved solids (ppm)
    pub tds: f64,
    /// Nutrient solution acidity
    pub ph: f64,
    /// Growth days precomputed upstream, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_days: Option<u32>,
}

impl SensorPayload {
    /// Raw value of one tracked field
    pub fn value(&self, field: SensorField) -> f64 {
        match field {
            SensorField::Temperature => self.temperature,
            SensorField::Humidity => self.humidity,
            SensorField::Tds => self.tds,
            SensorField::Ph => self.ph,
        }
    }
}

/// Validated sensor reading, immutable once built
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub date: NaiveDate,
    pub temperature: f64,
    pub humidity: f64,
    pub tds: f64,
    pub ph: f64,
    pub growth_days: Option<u32>,
}

impl Reading {
    /// Build a reading without upstream growth days
    pub fn new(date: NaiveDate, temperature: f64, humidity: f64, tds: f64, ph: f64) -> Self {
        Self {
            date,
            temperature,
            humidity,
            tds,
            ph,
            growth_days: None,
        }
    }

    /// Value of one tracked field
    pub fn value(&self, field: SensorField) -> f64 {
        match field {
            SensorField::Temperature => self.temperature,
            SensorField::Humidity => self.humidity,
            SensorField::Tds => self.tds,
            SensorField::Ph => self.ph,
        }
    }
}

/// Numeric fields tracked by the feature pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorField {
    Temperature,
    Humidity,
    Tds,
    Ph,
}

impl SensorField {
    /// All tracked fields in canonical column order
    pub const ALL: [SensorField; 4] = [
        SensorField::Temperature,
        SensorField::Humidity,
        SensorField::Tds,
        SensorField::Ph,
    ];

    /// Payload key
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorField::Temperature => "temperature",
            SensorField::Humidity => "humidity",
            SensorField::Tds => "tds",
            SensorField::Ph => "ph",
        }
    }

    /// Column name used by the trained model
    pub fn column_name(&self) -> &'static str {
        match self {
            SensorField::Temperature => "Temperature",
            SensorField::Humidity => "Humidity",
            SensorField::Tds => "TDS Value",
            SensorField::Ph => "pH Level",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_deserialize_without_growth_days() {
        let json = r#"{"date":"2024-01-01","temperature":20.5,"humidity":60.0,"tds":800.0,"ph":6.2}"#;
        let payload: SensorPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.date, "2024-01-01");
        assert_eq!(payload.growth_days, None);
        assert!((payload.tds - 800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_field_columns() {
        let names: Vec<_> = SensorField::ALL.iter().map(|f| f.column_name()).collect();
        assert_eq!(names, vec!["Temperature", "Humidity", "TDS Value", "pH Level"]);
    }
}
