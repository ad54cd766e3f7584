//! Error types for zk-core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for zk-core operations.
pub type Result<T> = std::result::Result<T, ZkError>;

/// Errors that abort a visualization run.
///
/// A file whose name has no numeric id prefix is not an error; the parser
/// skips it.
#[derive(Error, Debug)]
pub enum ZkError {
    /// Parsing produced zero zettels.
    #[error("I'm sorry, I couldn't find any zettels. Zettel file names must look like \"<id> <title>.md\"")]
    NoZettelsFound,

    /// The Graphviz layout engine is not installed or not on PATH.
    #[error(
        "Graphviz layout engine '{engine}' was not found on PATH. \
         Install Graphviz (https://graphviz.org/download/, e.g. `apt install graphviz` \
         or `brew install graphviz`) or drop --use-graphviz to get the interactive plot"
    )]
    MissingRenderEngine {
        /// Executable that was searched for.
        engine: String,
    },

    /// A zettel could not be read or is not valid UTF-8.
    #[error("Failed to read zettel {}: {source}", path.display())]
    UnreadableFile {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying read or decode error.
        #[source]
        source: std::io::Error,
    },

    /// A discovery glob pattern is malformed.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// Description of the problem.
        message: String,
    },

    /// The layout engine ran but did not produce an output.
    #[error("{engine} failed to render the graph: {message}")]
    RenderFailed {
        /// Executable that was run.
        engine: String,
        /// Captured stderr or exit status.
        message: String,
    },

    /// IO error writing output files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error for the embedded figure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ZkError::MissingRenderEngine {
            engine: "sfdp".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sfdp"));
        assert!(msg.contains("Install Graphviz"));

        let err = ZkError::UnreadableFile {
            path: PathBuf::from("/notes/1 Intro.md"),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        };
        assert!(err.to_string().contains("1 Intro.md"));
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_missing_engine_is_distinguishable() {
        let err = ZkError::MissingRenderEngine {
            engine: "dot".to_string(),
        };
        assert!(matches!(err, ZkError::MissingRenderEngine { .. }));
        assert!(!matches!(err, ZkError::Io(_)));
    }
}
