//! wf-core: shared foundation for washflow.
//!
//! Contains:
//! - ids (compact handles for circuit nodes and pipes)
//! - geometry (canvas positions and placement clamping)
//! - units (uom SI types for pipe lengths and activation durations)
//! - numeric (parsing of entered form values)
//! - error (shared error types)

pub mod error;
pub mod geometry;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{WfError, WfResult};
pub use geometry::{clamp_to_canvas, CanvasRect, Point};
pub use ids::*;
pub use numeric::*;
pub use units::*;
