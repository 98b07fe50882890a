//! Error types for the wf-app service layer.

use std::path::PathBuf;

use wf_graph::GraphError;

/// Application error shared by the CLI and the GUI.
///
/// Every variant is meant to end up as a notice; none should cross the UI loop.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{field}: {reason}")]
    InputValidation { field: String, reason: String },

    #[error("{0}")]
    GraphConstraint(GraphError),

    #[error("Missing reference: {0}")]
    MissingReference(String),

    #[error("Failed to save {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },

    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read settings file {path}: {reason}")]
    Settings { path: PathBuf, reason: String },

    #[error("Sequence error: {0}")]
    Sequence(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type for wf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Graph rejections and form errors are expected; the rest are worth an error log.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::InputValidation { .. } | AppError::GraphConstraint(_)
        )
    }
}

impl From<GraphError> for AppError {
    fn from(err: GraphError) -> Self {
        if err.is_constraint() {
            AppError::GraphConstraint(err)
        } else {
            AppError::InvalidState(err.to_string())
        }
    }
}

impl From<wf_core::WfError> for AppError {
    fn from(err: wf_core::WfError) -> Self {
        match err {
            wf_core::WfError::InvalidInput { field, reason } => {
                AppError::InputValidation { field, reason }
            }
            other => AppError::InvalidState(other.to_string()),
        }
    }
}

impl From<wf_project::ProjectError> for AppError {
    fn from(err: wf_project::ProjectError) -> Self {
        match err {
            wf_project::ProjectError::Persistence { path, reason } => {
                AppError::Persistence { path, reason }
            }
            wf_project::ProjectError::Validation(v) => AppError::Project(v.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<wf_project::ValidationError> for AppError {
    fn from(err: wf_project::ValidationError) -> Self {
        match err {
            wf_project::ValidationError::MissingReference { .. } => {
                AppError::MissingReference(err.to_string())
            }
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<wf_sequence::SequenceError> for AppError {
    fn from(err: wf_sequence::SequenceError) -> Self {
        match err {
            wf_sequence::SequenceError::InvalidDuration { name, reason } => {
                AppError::InputValidation {
                    field: name,
                    reason,
                }
            }
            other => AppError::Sequence(other.to_string()),
        }
    }
}
