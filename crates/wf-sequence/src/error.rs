use thiserror::Error;

pub type SequenceResult<T> = Result<T, SequenceError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    #[error("Row {row} does not exist ({len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("Invalid duration for {name}: {reason}")]
    InvalidDuration { name: String, reason: String },

    #[error("Unknown {what} '{value}'")]
    UnknownTag { what: &'static str, value: String },
}
