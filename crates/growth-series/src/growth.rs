//! Growth-Day Derivation

use crate::series::{DailyRow, Series};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How growth days are obtained for a series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthDayPolicy {
    /// Always derive from dates, overwriting supplied values
    #[default]
    Compute,
    /// Use supplied values when every row has one and they never decrease
    PreferSupplied,
}

/// Where the growth days of a series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthDaySource {
    Computed,
    Supplied,
}

/// A series with a growth-day value for every row
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthSeries {
    series: Series,
    growth_days: Vec<u32>,
    source: GrowthDaySource,
}

impl GrowthSeries {
    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn rows(&self) -> &[DailyRow] {
        self.series.rows()
    }

    /// Growth days, aligned with `rows()`
    pub fn growth_days(&self) -> &[u32] {
        &self.growth_days
    }

    pub fn source(&self) -> GrowthDaySource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Derives whole days elapsed since a plant's first observation
pub struct GrowthDayCalculator;

impl GrowthDayCalculator {
    /// Whole days between each row's date and the first date of the series
    pub fn compute(series: &Series) -> Vec<u32> {
        let Some(first) = series.first_date() else {
            return Vec::new();
        };
        series
            .rows()
            .iter()
            .map(|row| days_between(first, row.date))
            .collect()
    }

    /// Supplied growth days, if every row carries one and they never decrease
    pub fn supplied(series: &Series) -> Option<Vec<u32>> {
        let days = series
            .rows()
            .iter()
            .map(|row| row.growth_days)
            .collect::<Option<Vec<u32>>>()?;
        days.windows(2).all(|w| w[0] <= w[1]).then_some(days)
    }

    /// Attach growth days to the series under the given policy.
    ///
    /// Computed values replace every row's supplied value; supplied and
    /// computed values are never mixed.
    pub fn apply(series: Series, policy: GrowthDayPolicy) -> GrowthSeries {
        if policy == GrowthDayPolicy::PreferSupplied {
            match Self::supplied(&series) {
                Some(growth_days) => {
                    debug!("Using {} supplied growth days", growth_days.len());
                    return GrowthSeries {
                        series,
                        growth_days,
                        source: GrowthDaySource::Supplied,
                    };
                }
                None if series.rows().iter().any(|r| r.growth_days.is_some()) => {
                    warn!("Supplied growth days are partial or decreasing, recomputing from dates");
                }
                None => {}
            }
        }

        let growth_days = Self::compute(&series);
        GrowthSeries {
            series,
            growth_days,
            source: GrowthDaySource::Computed,
        }
    }
}

fn days_between(first: NaiveDate, date: NaiveDate) -> u32 {
    let days = (date - first).num_days().max(0);
    u32::try_from(days).unwrap_or(u32::MAX)
}
