//! Decides what happens to each file and directory met during a build.

use crate::config::Config;
use std::fmt;

/// What the build does with a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Render through the template engine.
    Process,
    /// Copy byte for byte.
    Copy,
    /// Copy byte for byte under the given file name.
    Rename(String),
    /// Leave out of the output.
    Skip,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Process => write!(f, "process"),
            Disposition::Copy => write!(f, "copy"),
            Disposition::Rename(target) => write!(f, "rename to '{target}'"),
            Disposition::Skip => write!(f, "skip"),
        }
    }
}

/// Classifies `filename` (a bare name, not a path) under `config`.
///
/// The first match wins, in this order: `process` patterns, `copy`
/// patterns, exact `rename` keys. Anything else is skipped.
pub fn classify(config: &Config, filename: &str) -> Disposition {
    if config.process.is_match(filename) {
        Disposition::Process
    } else if config.copy.is_match(filename) {
        Disposition::Copy
    } else if let Some(target) = config.rename.get(filename) {
        Disposition::Rename(target.clone())
    } else {
        Disposition::Skip
    }
}

/// Returns true if the subdirectory `dirname` must not be visited.
pub fn should_skip_dir(config: &Config, dirname: &str) -> bool {
    config.dirs_to_skip.is_match(dirname)
}
