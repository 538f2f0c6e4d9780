//! Daily Aggregation

use crate::series::{DailyRow, Series};
use crate::SeriesError;
use chrono::NaiveDate;
use data_validator::{Reading, ValidationError};
use std::collections::BTreeMap;
use tracing::debug;

/// Running sums for one calendar day
#[derive(Debug, Default)]
struct DayAccumulator {
    count: usize,
    temperature: f64,
    humidity: f64,
    tds: f64,
    ph: f64,
    growth_days: Option<u32>,
}

impl DayAccumulator {
    fn add(&mut self, reading: &Reading) {
        self.count += 1;
        self.temperature += reading.temperature;
        self.humidity += reading.humidity;
        self.tds += reading.tds;
        self.ph += reading.ph;
        self.growth_days = match (self.growth_days, reading.growth_days) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }

    fn finish(self, date: NaiveDate) -> DailyRow {
        let n = self.count as f64;
        DailyRow {
            date,
            temperature: self.temperature / n,
            humidity: self.humidity / n,
            tds: self.tds / n,
            ph: self.ph / n,
            growth_days: self.growth_days,
        }
    }
}

/// Collapses same-day readings of one plant into daily means
pub struct DailyAggregator;

impl DailyAggregator {
    /// Average readings per date and return them sorted ascending.
    ///
    /// Readings may arrive in any order. N readings over D distinct dates
    /// always yield exactly D rows.
    pub fn aggregate(readings: &[Reading]) -> Result<Series, SeriesError> {
        if readings.is_empty() {
            return Err(ValidationError::EmptyPayload.into());
        }

        let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
        for reading in readings {
            days.entry(reading.date).or_default().add(reading);
        }

        debug!(
            "Aggregated {} readings into {} daily rows",
            readings.len(),
            days.len()
        );

        let rows = days
            .into_iter()
            .map(|(date, acc)| acc.finish(date))
            .collect();
        Series::from_rows(rows)
    }
}
