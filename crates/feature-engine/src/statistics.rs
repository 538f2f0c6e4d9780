//! Expanding (cumulative) statistics

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Statistic tracked for every feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Mean,
    Std,
    Min,
    Max,
    Median,
}

impl StatKind {
    /// Column order used by the trained model
    pub const ALL: [StatKind; 5] = [
        StatKind::Mean,
        StatKind::Std,
        StatKind::Min,
        StatKind::Max,
        StatKind::Median,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StatKind::Mean => "Mean",
            StatKind::Std => "Std",
            StatKind::Min => "Min",
            StatKind::Max => "Max",
            StatKind::Median => "Median",
        }
    }
}

/// Statistics of everything observed so far
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpandingStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (ddof = 1), NaN for a single observation
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Median, averaging the two middle values for even counts
    pub median: f64,
}

impl ExpandingStats {
    pub fn get(&self, stat: StatKind) -> f64 {
        match stat {
            StatKind::Mean => self.mean,
            StatKind::Std => self.std_dev,
            StatKind::Min => self.min,
            StatKind::Max => self.max,
            StatKind::Median => self.median,
        }
    }
}

/// Running window over an ordered sequence of values.
///
/// Mean is `sum / n`; variance uses Welford's update so long histories of
/// near-constant readings do not lose precision.
#[derive(Debug, Clone, Default)]
pub struct ExpandingWindow {
    count: usize,
    sum: f64,
    welford_mean: f64,
    m2: f64,
    min: f64,
    max: f64,
    sorted: Vec<f64>,
}

impl ExpandingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values observed
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Add the next value and return the statistics including it
    pub fn push(&mut self, value: f64) -> ExpandingStats {
        self.count += 1;
        self.sum += value;

        let delta = value - self.welford_mean;
        self.welford_mean += delta / self.count as f64;
        self.m2 += delta * (value - self.welford_mean);

        if self.count == 1 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }

        let pos = self.sorted.partition_point(|x| x.total_cmp(&value).is_le());
        self.sorted.insert(pos, value);

        self.snapshot()
    }

    /// Current statistics; all NaN before the first value
    pub fn snapshot(&self) -> ExpandingStats {
        if self.count == 0 {
            return ExpandingStats {
                mean: f64::NAN,
                std_dev: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
                median: f64::NAN,
            };
        }

        let n = self.count as f64;
        let std_dev = if self.count < 2 {
            f64::NAN
        } else {
            (self.m2 / (n - 1.0)).max(0.0).sqrt()
        };

        let mid = self.count / 2;
        let median = if self.count % 2 == 1 {
            self.sorted[mid]
        } else {
            (self.sorted[mid - 1] + self.sorted[mid]) / 2.0
        };

        ExpandingStats {
            mean: self.sum / n,
            std_dev,
            min: self.min,
            max: self.max,
            median,
        }
    }
}

/// Expanding statistics at every position, never looking ahead
pub fn expanding(values: &[f64]) -> Vec<ExpandingStats> {
    let mut window = ExpandingWindow::new();
    values.iter().map(|&v| window.push(v)).collect()
}

/// Expanding statistics restarted per group.
///
/// Row `i` sees only the earlier rows sharing `groups[i]`, in their relative
/// order; rows of other groups never affect it.
pub fn expanding_by_group<K>(values: &[f64], groups: &[K]) -> Vec<ExpandingStats>
where
    K: Copy + Eq + Hash,
{
    debug_assert_eq!(values.len(), groups.len());
    let mut windows: HashMap<K, ExpandingWindow> = HashMap::new();
    values
        .iter()
        .zip(groups)
        .map(|(&v, &g)| windows.entry(g).or_default().push(v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_value() {
        let stats = expanding(&[7.5]);
        let s = stats[0];
        assert_eq!(s.mean, 7.5);
        assert_eq!(s.min, 7.5);
        assert_eq!(s.max, 7.5);
        assert_eq!(s.median, 7.5);
        assert!(s.std_dev.is_nan());
    }

    #[test]
    fn test_running_values() {
        let stats = expanding(&[4.0, 2.0, 9.0, 1.0]);
        assert_eq!(stats[1].mean, 3.0);
        assert_eq!(stats[1].median, 3.0);
        assert!((stats[1].std_dev - 2.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats[2].median, 4.0);
        assert_eq!(stats[2].max, 9.0);
        assert_eq!(stats[3].min, 1.0);
        assert_eq!(stats[3].median, 3.0);
        assert_eq!(stats[3].mean, 4.0);
    }

    #[test]
    fn test_sample_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let last = *expanding(&values).last().unwrap();
        // Population std is 2.0; sample std is sqrt(32 / 7)
        assert!((last.std_dev - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_constant_values_have_zero_std() {
        let stats = expanding(&[20.0; 7]);
        assert!(stats[0].std_dev.is_nan());
        for s in &stats[1..] {
            assert_eq!(s.mean, 20.0);
            assert_eq!(s.std_dev, 0.0);
        }
    }

    #[test]
    fn test_groups_are_independent() {
        let values = [1.0, 2.0, 100.0, 3.0, 200.0];
        let groups = [0, 0, 1, 0, 1];
        let stats = expanding_by_group(&values, &groups);
        assert_eq!(stats[2].mean, 100.0);
        assert!(stats[2].std_dev.is_nan());
        assert_eq!(stats[3].mean, 2.0);
        assert_eq!(stats[3].max, 3.0);
        assert_eq!(stats[4].mean, 150.0);
        assert_eq!(stats[4].min, 100.0);
    }

    #[test]
    fn test_large_magnitudes_stay_finite() {
        let values = [1e100, -1e100, 1e100, 1e100, -1e100];
        for s in &expanding(&values)[1..] {
            assert!(s.mean.is_finite());
            assert!(s.std_dev.is_finite());
            assert!(s.median.is_finite());
        }
    }

    #[test]
    fn test_empty_window_snapshot() {
        let window = ExpandingWindow::new();
        assert!(window.is_empty());
        assert!(window.snapshot().mean.is_nan());
    }

    proptest! {
        #[test]
        fn prop_last_mean_is_column_mean(values in prop::collection::vec(-1000.0f64..1000.0, 1..200)) {
            let last = *expanding(&values).last().unwrap();
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            prop_assert!((last.mean - mean).abs() <= 1e-9 * mean.abs().max(1.0));
        }

        #[test]
        fn prop_min_le_median_le_max(values in prop::collection::vec(-50.0f64..50.0, 1..100)) {
            for s in expanding(&values) {
                prop_assert!(s.min <= s.median && s.median <= s.max);
                prop_assert!(s.min <= s.mean + 1e-9 && s.mean <= s.max + 1e-9);
            }
        }

        #[test]
        fn prop_never_looks_ahead(
            values in prop::collection::vec(-50.0f64..50.0, 2..60),
            tail in prop::collection::vec(-50.0f64..50.0, 1..20),
        ) {
            let head = expanding(&values);
            let mut extended = values.clone();
            extended.extend(tail);
            let full = expanding(&extended);
            for (a, b) in head.iter().zip(&full) {
                prop_assert_eq!(a.mean, b.mean);
                prop_assert_eq!(a.median, b.median);
            }
        }
    }
}
