//! Error types shared by the library and the hook binary.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SuggesterError {
    #[error("Failed to read stdin: {0}")]
    StdinRead(#[from] io::Error),

    #[error("Failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read skill index from {path}: {source}")]
    IndexRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse skill index {path}: {message}")]
    IndexParse { path: PathBuf, message: String },

    #[error("Skill index not found at {0}")]
    IndexNotFound(PathBuf),

    #[error("No skill index sources given")]
    NoIndexSources,

    #[error("Home directory not found")]
    NoHomeDir,
}

impl SuggesterError {
    /// True when matching could not run at all because no usable index exists.
    ///
    /// Callers use this to tell "nothing matched" apart from "couldn't match".
    pub fn is_index_unavailable(&self) -> bool {
        matches!(
            self,
            SuggesterError::IndexRead { .. }
                | SuggesterError::IndexParse { .. }
                | SuggesterError::IndexNotFound(_)
                | SuggesterError::NoIndexSources
        )
    }
}

pub type Result<T, E = SuggesterError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_errors_are_unavailable() {
        assert!(SuggesterError::IndexNotFound(PathBuf::from("/x")).is_index_unavailable());
        assert!(SuggesterError::IndexParse {
            path: PathBuf::from("/x"),
            message: "bad".to_string(),
        }
        .is_index_unavailable());
        assert!(SuggesterError::NoIndexSources.is_index_unavailable());
        assert!(!SuggesterError::NoHomeDir.is_index_unavailable());
    }
}
