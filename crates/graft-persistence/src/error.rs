//! Persistence error types.
//!
//! All persistence operations return structured errors that provide
//! user-friendly messages and optional remediation hints. The boolean
//! operations on [`Persistence`](crate::Persistence) collapse them to
//! `false` after logging.

use std::path::PathBuf;
use thiserror::Error;

use crate::codec::CodecError;

/// Broad failure category, for callers that only need to branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Missing path, missing file name, missing file or empty input.
    /// Reported before any I/O is attempted.
    Precondition,
    /// Reading, writing or renaming failed.
    Io,
    /// The codec could not produce or parse the document.
    Parse,
    /// The document names a type discovery did not make known to the codec.
    Discovery,
}

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// No path was given.
    #[error("No path given")]
    MissingPath,

    /// The object has no file name to save under.
    #[error("Object has no file name")]
    MissingFileName,

    /// The file to load does not exist.
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    /// The text to load from is empty.
    #[error("Document text is empty")]
    EmptyDocument,

    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Failed to serialize {type_name}")]
    Serialization {
        type_name: &'static str,
        #[source]
        source: CodecError,
    },

    /// Deserialization error.
    #[error("Failed to deserialize {type_name}")]
    Deserialization {
        type_name: &'static str,
        path: Option<PathBuf>,
        #[source]
        source: CodecError,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingPath | Self::MissingFileName | Self::NotFound { .. } | Self::EmptyDocument => {
                FailureKind::Precondition
            }
            Self::Io { .. } | Self::AtomicWriteFailed { .. } => FailureKind::Io,
            Self::Serialization { source, .. } | Self::Deserialization { source, .. } => {
                match source {
                    CodecError::Io(_) => FailureKind::Io,
                    CodecError::UnknownType { .. } => FailureKind::Discovery,
                    CodecError::EmptyDocument => FailureKind::Precondition,
                    _ => FailureKind::Parse,
                }
            }
        }
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingPath => "No file was specified.".to_string(),
            Self::MissingFileName => {
                "The document has no file name yet, so it cannot be saved.".to_string()
            }
            Self::NotFound { path } => format!("The file {} does not exist.", path.display()),
            Self::EmptyDocument => "There is no document content to load.".to_string(),
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::Serialization { type_name, source } => match source {
                CodecError::UnknownType { name } => format!(
                    "The {type_name} contains a '{name}' value that is not registered for saving."
                ),
                _ => format!("An error occurred while saving the {type_name}."),
            },
            Self::Deserialization {
                type_name, source, ..
            } => match source {
                CodecError::UnknownType { name } => format!(
                    "The document contains a '{name}' value that this {type_name} does not accept."
                ),
                CodecError::UnexpectedRoot { found, .. } => {
                    format!("The document holds a {found}, not a {type_name}.")
                }
                _ => format!(
                    "An error occurred while reading the {type_name}. The document may be corrupted."
                ),
            },
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::MissingPath | Self::EmptyDocument => None,
            Self::MissingFileName => {
                Some("Give the document a file name or save it to a full file path.".into())
            }
            Self::NotFound { .. } => Some("Check the path, or save the document first.".into()),
            Self::Io { operation, .. } => {
                if *operation == "read" || *operation == "open" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::Serialization { source, .. } | Self::Deserialization { source, .. } => {
                match source {
                    CodecError::UnknownType { .. } => Some(
                        "Register the type and include it from a type that allows dynamic types."
                            .into(),
                    ),
                    _ => None,
                }
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
        }
    }
}

/// Errors raised while loading a [`PersistenceConfig`](crate::PersistenceConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid persistence config")]
    Parse(#[from] toml::de::Error),
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_kinds() {
        assert_eq!(PersistenceError::MissingPath.kind(), FailureKind::Precondition);
        assert_eq!(PersistenceError::MissingFileName.kind(), FailureKind::Precondition);
        assert_eq!(
            PersistenceError::NotFound {
                path: PathBuf::from("missing.xml")
            }
            .kind(),
            FailureKind::Precondition
        );
    }

    #[test]
    fn test_codec_kinds() {
        let unknown = PersistenceError::Deserialization {
            type_name: "Config",
            path: None,
            source: CodecError::UnknownType {
                name: "Hexagon".to_string(),
            },
        };
        assert_eq!(unknown.kind(), FailureKind::Discovery);
        assert!(unknown.user_message().contains("Hexagon"));
        assert!(unknown.suggestion().is_some());

        let io = PersistenceError::Serialization {
            type_name: "Config",
            source: CodecError::Io(std::io::Error::other("disk full")),
        };
        assert_eq!(io.kind(), FailureKind::Io);
    }

    #[test]
    fn test_wrong_root_is_parse_failure() {
        let err = PersistenceError::Deserialization {
            type_name: "Config",
            path: None,
            source: CodecError::UnexpectedRoot {
                expected: "Config".to_string(),
                found: "Other".to_string(),
            },
        };
        assert_eq!(err.kind(), FailureKind::Parse);
        assert!(err.user_message().contains("Other"));
    }
}
