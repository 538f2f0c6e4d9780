//! Date-ordered daily rows

use crate::SeriesError;
use chrono::NaiveDate;
use data_validator::SensorField;
use serde::{Deserialize, Serialize};

/// One aggregated row per calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub temperature: f64,
    pub humidity: f64,
    pub tds: f64,
    pub ph: f64,
    /// Growth days supplied upstream (minimum over the day's readings)
    pub growth_days: Option<u32>,
}

impl DailyRow {
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

/// Daily rows of one plant, strictly increasing by date
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    rows: Vec<DailyRow>,
}

impl Series {
    /// Wrap rows that must already be strictly increasing by date.
    ///
    /// Duplicate or unordered dates mean aggregation did not run; this is a
    /// contract violation and is never repaired here.
    pub fn from_rows(rows: Vec<DailyRow>) -> Result<Self, SeriesError> {
        for pair in rows.windows(2) {
            let (previous, next) = (pair[0].date, pair[1].date);
            if next == previous {
                return Err(SeriesError::DuplicateDate(next));
            }
            if next < previous {
                return Err(SeriesError::OutOfOrder { previous, next });
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[DailyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First observed date
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    /// Most recent date
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// One field as a column, in date order
    pub fn column(&self, field: SensorField) -> Vec<f64> {
        self.rows.iter().map(|r| r.value(field)).collect()
    }
}
