use thiserror::Error;

pub type WfResult<T> = Result<T, WfError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("{field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}

impl WfError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        WfError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
