use thiserror::Error;

use crate::data::model::FieldSelector;

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

/// Errors raised while turning a [`RecordTable`](crate::data::model::RecordTable)
/// into aggregated chart data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    /// There are no records, so a mean is undefined.
    #[error("no records to aggregate")]
    EmptyDataset,

    /// Histogram parameters do not describe at least one bin.
    #[error("invalid bin configuration: width {width}, upper bound {upper_bound}")]
    InvalidConfiguration { width: f64, upper_bound: f64 },

    /// A record's categorical code has no entry in the supplied mapping.
    #[error("row {row}: {field} code '{code}' has no mapped label")]
    UnmappedCode {
        row: usize,
        field: FieldSelector,
        code: String,
    },
}

/// Errors raised by [`SceneController`](crate::scene::SceneController) navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("scene {index} does not exist ({count} scenes)")]
    OutOfRange { index: usize, count: usize },

    #[error("scene {index} has not been reached yet")]
    Locked { index: usize },
}
