//! Error handling for cascade.
//! Defines the error kinds a build can run into and the result alias used
//! throughout the crate.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while building a site.
///
/// Only [`Error::MissingRootConfig`] and failures to read the source root abort
/// a build. Everything else is reported per file or per directory and the
/// build carries on.
#[derive(Error, Debug)]
pub enum Error {
    /// The site configuration file given to the build does not exist.
    #[error("Site configuration '{}' does not exist.", path.display())]
    MissingRootConfig { path: PathBuf },

    /// A configuration file exists but could not be read or parsed.
    #[error("Error processing configuration '{}': {reason}.", path.display())]
    MalformedConfig { path: PathBuf, reason: String },

    /// A template or markdown source failed to render.
    #[error("Error processing '{}': {reason}", path.display())]
    Render { path: PathBuf, reason: String },

    /// A `rename` target would leave the file's destination directory.
    #[error("Cannot rename '{}' to '{target}': target must be a relative path.", path.display())]
    InvalidRename { path: PathBuf, target: String },

    /// File system operation failed on the given path.
    #[error("IO error on '{}': {source}.", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Directory traversal failed.
    #[error("Walk error: {0}.")]
    Walk(#[from] walkdir::Error),

    /// A glob pattern could not be compiled.
    #[error("Invalid glob pattern: {0}.")]
    Glob(#[from] globset::Error),
}

impl Error {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        Error::Io { path: path.as_ref().to_path_buf(), source }
    }
}

/// Convenience type alias for Results with cascade's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;
