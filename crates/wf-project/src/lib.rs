//! wf-project: document format, persistence, validation and catalog tables.

pub mod catalog;
pub mod schema;
pub mod store;
pub mod validate;

use std::path::{Path, PathBuf};

pub use catalog::{Catalog, CatalogError, WashingComponentEntry};
pub use schema::*;
pub use store::{timestamp_now, DocumentStore, Section};
pub use validate::{validate_document, ValidationError};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to save {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },
}

/// Parse a saved document. Missing sections default to empty values.
pub fn load_json(path: &Path) -> ProjectResult<DocumentFile> {
    let content = std::fs::read_to_string(path)?;
    let file: DocumentFile = serde_json::from_str(&content)?;
    Ok(file)
}

/// Write a document atomically: temp file in the same directory, then rename.
///
/// On failure the temp file is removed and the target is left as it was.
pub fn save_json(path: &Path, file: &DocumentFile) -> ProjectResult<()> {
    let content = serde_json::to_string_pretty(file)?;
    let tmp = temp_path(path);
    let result = std::fs::write(&tmp, content).and_then(|_| std::fs::rename(&tmp, path));
    if let Err(err) = result {
        let _ = std::fs::remove_file(&tmp);
        tracing::error!(path = %path.display(), error = %err, "failed to save document");
        return Err(ProjectError::Persistence {
            path: path.to_path_buf(),
            reason: err.to_string(),
        });
    }
    Ok(())
}

/// Validate before writing; used by the headless tools.
pub fn save_json_validated(path: &Path, file: &DocumentFile) -> ProjectResult<()> {
    validate_document(&file.configuration)?;
    save_json(path, file)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "document.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
