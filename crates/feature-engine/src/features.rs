//! Feature Frame Assembly

use crate::phase::{Phase, PhaseAssigner};
use crate::statistics::{expanding, expanding_by_group, ExpandingStats, StatKind};
use chrono::NaiveDate;
use data_validator::SensorField;
use growth_series::GrowthSeries;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Column holding the phase code
pub const PHASE_COLUMN: &str = "Phase";
/// Column holding elapsed growth days
pub const GROWTH_DAYS_COLUMN: &str = "Growth Days";

/// Window a statistic is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatScope {
    /// All rows so far
    Expanding,
    /// Rows so far that share the current row's phase
    Phase,
}

impl StatScope {
    pub fn label(&self) -> &'static str {
        match self {
            StatScope::Expanding => "Expanding",
            StatScope::Phase => "Phase",
        }
    }
}

/// A column produced by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    Raw(SensorField),
    Phase,
    GrowthDays,
    Stat {
        field: SensorField,
        scope: StatScope,
        stat: StatKind,
    },
}

impl FeatureColumn {
    /// Canonical column order: raw fields, phase, growth days, then for each
    /// field its expanding stats followed by its phase stats
    pub fn layout() -> Vec<FeatureColumn> {
        let mut columns: Vec<FeatureColumn> =
            SensorField::ALL.iter().map(|&f| FeatureColumn::Raw(f)).collect();
        columns.push(FeatureColumn::Phase);
        columns.push(FeatureColumn::GrowthDays);
        for field in SensorField::ALL {
            for scope in [StatScope::Expanding, StatScope::Phase] {
                for stat in StatKind::ALL {
                    columns.push(FeatureColumn::Stat { field, scope, stat });
                }
            }
        }
        columns
    }

    /// Name as seen by the trained model, e.g. `"TDS Value Phase Median"`
    pub fn name(&self) -> String {
        match self {
            FeatureColumn::Raw(field) => field.column_name().to_string(),
            FeatureColumn::Phase => PHASE_COLUMN.to_string(),
            FeatureColumn::GrowthDays => GROWTH_DAYS_COLUMN.to_string(),
            FeatureColumn::Stat { field, scope, stat } => {
                format!("{} {} {}", field.column_name(), scope.label(), stat.label())
            }
        }
    }
}

/// One daily row with all derived columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub growth_days: u32,
    pub phase: Phase,
    /// Values in the owning frame's column order
    pub values: Vec<f64>,
}

/// Feature rows of one plant sharing a column layout
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<FeatureRow>,
}

impl FeatureFrame {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<FeatureRow>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            columns,
            index,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Most recent row by date
    pub fn last_row(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// One value by row index and column name
    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let pos = self.position(name)?;
        self.rows.get(row).map(|r| r.values[pos])
    }

    /// A whole column by name
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let pos = self.position(name)?;
        Some(self.rows.iter().map(|r| r.values[pos]).collect())
    }
}

/// Computes phases and expanding statistics for one plant's series
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    layout: Vec<FeatureColumn>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            layout: FeatureColumn::layout(),
        }
    }

    /// Names of every column this extractor produces
    pub fn column_names(&self) -> Vec<String> {
        self.layout.iter().map(FeatureColumn::name).collect()
    }

    /// Build the feature frame; statistics follow the series' date order
    pub fn extract(&self, series: &GrowthSeries) -> FeatureFrame {
        let growth_days = series.growth_days();
        let phases = PhaseAssigner::assign(growth_days);

        let stats: HashMap<SensorField, (Vec<ExpandingStats>, Vec<ExpandingStats>)> =
            SensorField::ALL
                .iter()
                .map(|&field| {
                    let column = series.series().column(field);
                    (field, (expanding(&column), expanding_by_group(&column, &phases)))
                })
                .collect();

        let rows: Vec<FeatureRow> = series
            .rows()
            .iter()
            .enumerate()
            .map(|(i, daily)| {
                let values = self
                    .layout
                    .iter()
                    .map(|column| match *column {
                        FeatureColumn::Raw(field) => daily.value(field),
                        FeatureColumn::Phase => f64::from(phases[i].index()),
                        FeatureColumn::GrowthDays => f64::from(growth_days[i]),
                        FeatureColumn::Stat { field, scope, stat } => {
                            let (global, by_phase) = &stats[&field];
                            match scope {
                                StatScope::Expanding => global[i].get(stat),
                                StatScope::Phase => by_phase[i].get(stat),
                            }
                        }
                    })
                    .collect();
                FeatureRow {
                    date: daily.date,
                    growth_days: growth_days[i],
                    phase: phases[i],
                    values,
                }
            })
            .collect();

        debug!(
            "Extracted {} feature rows x {} columns",
            rows.len(),
            self.layout.len()
        );
        FeatureFrame::new(self.column_names(), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_validator::Reading;
    use growth_series::{DailyAggregator, GrowthDayCalculator, GrowthDayPolicy};

    fn frame_for(temperatures: &[f64]) -> FeatureFrame {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let readings: Vec<Reading> = temperatures
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let date = start + chrono::Days::new(i as u64);
                Reading::new(date, t, 60.0, 800.0 + i as f64, 6.0)
            })
            .collect();
        let series = DailyAggregator::aggregate(&readings).unwrap();
        let tagged = GrowthDayCalculator::apply(series, GrowthDayPolicy::Compute);
        FeatureExtractor::new().extract(&tagged)
    }

    #[test]
    fn test_column_count() {
        let extractor = FeatureExtractor::new();
        let names = extractor.column_names();
        // 4 raw + phase + growth days + 4 fields x 2 scopes x 5 stats
        assert_eq!(names.len(), 46);
        assert_eq!(&names[..6], &["Temperature", "Humidity", "TDS Value", "pH Level", "Phase", "Growth Days"]);
        assert_eq!(names[6], "Temperature Expanding Mean");
        assert_eq!(names[11], "Temperature Phase Mean");
        assert_eq!(names[45], "pH Level Phase Median");
    }

    #[test]
    fn test_single_row_statistics() {
        let frame = frame_for(&[23.5]);
        assert_eq!(frame.len(), 1);
        for stat in ["Mean", "Min", "Max", "Median"] {
            assert_eq!(frame.value(0, &format!("Temperature Expanding {stat}")), Some(23.5));
            assert_eq!(frame.value(0, &format!("Temperature Phase {stat}")), Some(23.5));
        }
        assert!(frame.value(0, "Temperature Expanding Std").unwrap().is_nan());
        assert!(frame.value(0, "Temperature Phase Std").unwrap().is_nan());
    }

    #[test]
    fn test_constant_week() {
        let frame = frame_for(&[20.0; 7]);
        let means = frame.column("Temperature Expanding Mean").unwrap();
        assert!(means.iter().all(|&m| m == 20.0));
        let stds = frame.column("Temperature Expanding Std").unwrap();
        assert!(stds[0].is_nan());
        assert!(stds[1..].iter().all(|&s| s == 0.0));
        assert!(frame.rows().iter().all(|r| r.phase == Phase::Early));
    }

    #[test]
    fn test_forty_days_phase_scoped() {
        let temperatures: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let frame = frame_for(&temperatures);

        let phases = frame.column(PHASE_COLUMN).unwrap();
        assert!(phases[..15].iter().all(|&p| p == 0.0));
        assert!(phases[15..30].iter().all(|&p| p == 1.0));
        assert!(phases[30..].iter().all(|&p| p == 2.0));

        // Phase 0 only ever sees days 0..=14
        assert_eq!(frame.value(14, "Temperature Phase Mean"), Some(7.0));
        assert_eq!(frame.value(14, "Temperature Phase Max"), Some(14.0));
        // Phase 1 restarts at day 15
        assert_eq!(frame.value(15, "Temperature Phase Mean"), Some(15.0));
        assert!(frame.value(15, "Temperature Phase Std").unwrap().is_nan());
        assert_eq!(frame.value(29, "Temperature Phase Min"), Some(15.0));
        // Global stats keep the whole history
        assert_eq!(frame.value(15, "Temperature Expanding Min"), Some(0.0));
        assert_eq!(frame.value(39, "Temperature Expanding Mean"), Some(19.5));
        assert_eq!(frame.value(39, "Temperature Phase Median"), Some(34.5));
    }

    #[test]
    fn test_growth_days_column() {
        let frame = frame_for(&[20.0, 21.0, 22.0]);
        assert_eq!(frame.column(GROWTH_DAYS_COLUMN).unwrap(), vec![0.0, 1.0, 2.0]);
        assert_eq!(frame.last_row().unwrap().growth_days, 2);
    }

    #[test]
    fn test_unknown_column() {
        let frame = frame_for(&[20.0]);
        assert_eq!(frame.position("Salinity Expanding Mean"), None);
        assert_eq!(frame.column("Salinity Expanding Mean"), None);
    }
}
