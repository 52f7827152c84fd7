//! Error types for starter-core
//!
//! Every pipeline step returns one of these. The builder matches on
//! [`ScaffoldError::kind`] to decide between aborting and rolling back.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using starter-core's error type
pub type Result<T> = std::result::Result<T, ScaffoldError>;

/// One pre-existing entry found in a target directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl fmt::Display for ConflictEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dir {
            write!(f, "{}/", self.path.display())
        } else {
            write!(f, "{}", self.path.display())
        }
    }
}

/// Scaffolding error types
#[derive(Error, Debug)]
pub enum ScaffoldError {
    /// Target directory already holds files
    #[error(
        "The directory {} contains files that could conflict:\n\n{}\n\nEither try using a new directory name, or remove the files listed above.",
        path.display(),
        format_entries(entries)
    )]
    ValidationConflict {
        path: PathBuf,
        entries: Vec<ConflictEntry>,
    },

    /// I/O failure while copying a template layer
    #[error("Failed to write {}: {source}", path.display())]
    Compose {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Library template without its package placeholder directory
    #[error("Template is missing its package placeholder directory: {}", path.display())]
    MissingPlaceholder { path: PathBuf },

    /// Manifest could not be generated
    #[error("Failed to generate pyproject.toml: {message}")]
    Manifest { message: String },

    /// Manifest or auxiliary file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    ManifestIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// External tool step failed
    #[error("{message}\n\n{hint}")]
    Delegate {
        tool: &'static str,
        hint: String,
        message: String,
    },

    /// Template bundle could not be loaded or is incomplete
    #[error("Template bundle error: {message}")]
    Bundle { message: String },
}

/// Coarse error classes the builder branches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationConflict,
    Compose,
    Manifest,
    Delegate,
    Bundle,
}

impl ScaffoldError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScaffoldError::ValidationConflict { .. } => ErrorKind::ValidationConflict,
            ScaffoldError::Compose { .. } | ScaffoldError::MissingPlaceholder { .. } => {
                ErrorKind::Compose
            }
            ScaffoldError::Manifest { .. } | ScaffoldError::ManifestIo { .. } => {
                ErrorKind::Manifest
            }
            ScaffoldError::Delegate { .. } => ErrorKind::Delegate,
            ScaffoldError::Bundle { .. } => ErrorKind::Bundle,
        }
    }

    pub(crate) fn compose(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScaffoldError::Compose {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn manifest_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScaffoldError::ManifestIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn bundle(message: impl Into<String>) -> Self {
        ScaffoldError::Bundle {
            message: message.into(),
        }
    }
}

fn format_entries(entries: &[ConflictEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("   {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
