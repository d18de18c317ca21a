//! Fatal errors. Per-file problems never surface here; they are absorbed at
//! the file boundary by the selector and renderer.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("Failed to launch git: {0}")]
    GitUnavailable(#[source] std::io::Error),

    #[error("Error cloning repository {url}: {message}")]
    CloneFailed { url: String, message: String },

    #[error("Failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),

    #[error("Source directory does not exist: {path}")]
    MissingSource { path: PathBuf },

    #[error("Failed to write output to {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error creating example ignore file {path}: {source}")]
    ExampleIgnore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
