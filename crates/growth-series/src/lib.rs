//! Growth Series
//!
//! Collapses validated readings into one row per calendar day and derives
//! elapsed growth days for a single plant's history.

mod aggregator;
mod growth;
mod series;

pub use aggregator::DailyAggregator;
pub use growth::{GrowthDayCalculator, GrowthDayPolicy, GrowthDaySource, GrowthSeries};
pub use series::{DailyRow, Series};

use chrono::NaiveDate;
use data_validator::ValidationError;
use thiserror::Error;

/// Errors while building a series
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Two rows share a date; aggregation was skipped or bypassed
    #[error("Schedule inconsistency: duplicate date {0}")]
    DuplicateDate(NaiveDate),
    #[error("Schedule inconsistency: {next} follows {previous}")]
    OutOfOrder { previous: NaiveDate, next: NaiveDate },
}
