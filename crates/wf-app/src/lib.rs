//! wf-app: service layer shared by the GUI and the CLI.
//!
//! Holds the canvas editors, the event bus that keeps component
//! availability in sync across pumps, the wizard pages and their
//! navigation, and the session-level file actions.

pub mod availability;
pub mod circuit_io;
pub mod editor;
pub mod error;
pub mod events;
pub mod navigation;
pub mod pages;
pub mod pipe_dialog;
pub mod sequence_io;
pub mod session;
pub mod settings;

pub use availability::AvailabilityTracker;
pub use circuit_io::summarize_document;
pub use editor::{
    CanvasEditor, CursorShape, EditorMode, Notice, NoticeLevel, PointerOutcome, Selection,
};
pub use error::{AppError, AppResult};
pub use events::{EditorEvent, EventBus};
pub use navigation::Navigator;
pub use pages::{Page, PageId, Pages};
pub use pipe_dialog::{PipeDialog, PipeForm, PipeTarget};
pub use session::Session;
pub use settings::{AppSettings, SETTINGS_FILE};
