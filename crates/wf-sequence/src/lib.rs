//! wf-sequence: activation rows derived from circuits, and their timeline.
//!
//! Rows are regenerated from circuit interpretations. Priorities follow one
//! rule per pump: rows sharing an output share a priority, and populated
//! outputs carry opposite priorities.

pub mod error;
pub mod row;
pub mod table;
pub mod timeline;

pub use error::{SequenceError, SequenceResult};
pub use row::{DurationUnit, Priority, SequenceRow};
pub use table::{PriorityConflict, SequenceTable};
pub use timeline::{format_tick, layout, tick_interval, Timeline, TimelineSpan};
