use std::{fs, io};
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

/// Gets the metadata for given `path`, returning:
/// - `Ok(Some(metadata))` if a file or directory exists at given path,
/// - `Ok(None)` if no file or directory exists at given path,
/// - `Err(e)` if there was an error getting the metadata for given path.
pub fn metadata(path: impl AsRef<Path>) -> Result<Option<Metadata>, io::Error> {
  match fs::metadata(path) {
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(e),
    Ok(m) => Ok(Some(m))
  }
}

/// Gets the last modified time of the file or directory at given `path`, returning `Ok(None)` if nothing exists at
/// given path.
pub fn modified(path: impl AsRef<Path>) -> Result<Option<SystemTime>, io::Error> {
  metadata(path)?.map(|m| m.modified()).transpose()
}
