//! Feature Engineering Engine
//!
//! Turns a plant's daily series into the expanding and phase-scoped
//! statistics the harvest model was trained on, then aligns them to the
//! model's frozen feature schema.

mod aligner;
mod features;
mod phase;
mod schema;
mod statistics;

pub use aligner::{AlignedMatrix, FeatureAligner, DEFAULT_FILL_VALUE};
pub use features::{
    FeatureColumn, FeatureExtractor, FeatureFrame, FeatureRow, StatScope, GROWTH_DAYS_COLUMN,
    PHASE_COLUMN,
};
pub use phase::{Phase, PhaseAssigner, PHASE_ONE_START_DAY, PHASE_TWO_START_DAY};
pub use schema::{FeatureSchema, HARVEST_SCHEMA_VERSION};
pub use statistics::{expanding, expanding_by_group, ExpandingStats, ExpandingWindow, StatKind};

use thiserror::Error;

/// Errors while building or aligning features
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("Feature schema is empty")]
    EmptySchema,
    #[error("Feature schema lists '{0}' more than once")]
    DuplicateFeature(String),
    #[error("No feature rows to align")]
    EmptyFrame,
}
