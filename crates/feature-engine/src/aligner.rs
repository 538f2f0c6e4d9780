//! Alignment of feature rows to a model's expected columns

use crate::features::{FeatureFrame, FeatureRow};
use crate::FeatureError;
use ndarray::{Array2, ArrayView1};
use tracing::debug;

/// Value written for expected columns that are missing or undefined
pub const DEFAULT_FILL_VALUE: f64 = 0.0;

/// Feature rows reindexed to an exact, ordered column list
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedMatrix {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl AlignedMatrix {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.row(index)
    }

    /// One value by row index and column name
    pub fn get(&self, row: usize, name: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == name)?;
        self.values.get((row, col)).copied()
    }
}

/// Reorders and pads feature rows to the expected column list.
///
/// Columns the frame has but the list does not are dropped. Listed columns
/// the frame lacks, and NaN values such as the standard deviation of a
/// single observation, become the fill value. Validated readings are bounded
/// by `LENIENT_LIMIT` at most, so the sample std of a single observation is
/// the only NaN the extractor produces.
#[derive(Debug, Clone)]
pub struct FeatureAligner<'a> {
    expected: &'a [String],
    fill_value: f64,
}

impl<'a> FeatureAligner<'a> {
    pub fn new(expected: &'a [String]) -> Self {
        Self {
            expected,
            fill_value: DEFAULT_FILL_VALUE,
        }
    }

    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = fill_value;
        self
    }

    /// Align only the most recent row; this is what the model predicts from
    pub fn align_last(&self, frame: &FeatureFrame) -> Result<AlignedMatrix, FeatureError> {
        let last = frame.last_row().ok_or(FeatureError::EmptyFrame)?;
        Ok(self.align_rows(frame, std::slice::from_ref(last)))
    }

    /// Align every row, oldest first
    pub fn align_all(&self, frame: &FeatureFrame) -> AlignedMatrix {
        self.align_rows(frame, frame.rows())
    }

    fn align_rows(&self, frame: &FeatureFrame, rows: &[FeatureRow]) -> AlignedMatrix {
        let positions: Vec<Option<usize>> = self
            .expected
            .iter()
            .map(|name| frame.position(name))
            .collect();

        let missing = positions.iter().filter(|p| p.is_none()).count();
        if missing > 0 {
            debug!(
                "{} of {} expected columns not produced, filling with {}",
                missing,
                self.expected.len(),
                self.fill_value
            );
        }

        let mut values = Array2::from_elem((rows.len(), self.expected.len()), self.fill_value);
        for (i, row) in rows.iter().enumerate() {
            for (j, pos) in positions.iter().enumerate() {
                if let Some(v) = pos.map(|p| row.values[p]).filter(|v| !v.is_nan()) {
                    values[[i, j]] = v;
                }
            }
        }

        AlignedMatrix {
            columns: self.expected.to_vec(),
            values,
        }
    }
}
