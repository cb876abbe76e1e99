//! Output writing for cascade.
//! Every rendered, copied or renamed file reaches the destination tree
//! through [`write_output`].

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Writes `content` to `dest`, creating missing parent directories and
/// overwriting any existing file.
///
/// The write is not atomic: an interrupted write can leave a partial file.
///
/// # Errors
/// * `Error::Io` if a directory cannot be created or the file cannot be written
pub fn write_output<P: AsRef<Path>>(dest: P, content: &[u8]) -> Result<()> {
    let dest = dest.as_ref();
    if let Some(parent) = dest.parent() {
        // create_dir_all tolerates directories that already exist.
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(dest, content).map_err(|e| Error::io(dest, e))
}

/// Reads a source file.
///
/// # Errors
/// * `Error::Io` if the file cannot be read
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| Error::io(path, e))
}
