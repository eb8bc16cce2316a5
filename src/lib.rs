//! Salary scenes engine: record loading, categorical aggregation, histogram
//! binning and the scene catalogue driving the viewer.
//!
//! Everything here is independent of rendering; the `salary-scenes` binary
//! only turns [`scene::SceneData`] into egui widgets.

pub mod config;
pub mod data;
pub mod error;
pub mod scene;

pub use config::ViewerConfig;
pub use error::{AggregateError, SceneError};
