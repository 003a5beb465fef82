use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Library-wide error type for project inspection.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The supplied project path was empty.
    #[error("project path must be a non-empty path")]
    InvalidPath,

    /// The current directory could not be determined while resolving a relative path.
    #[error("resolving absolute form of {path}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// project.json is missing or unreadable.
    #[error("reading project manifest at {path}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// project.json is not valid JSON.
    #[error("parsing project manifest at {path}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// project.json parsed, but its root is not a JSON object.
    #[error("project manifest at {path} must contain a JSON object")]
    ManifestNotObject { path: PathBuf },

    /// Walking the project tree for workflow files failed.
    #[error("listing workflow files under {root}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type Result<T> = std::result::Result<T, ProjectError>;
