use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tempfile::{NamedTempFile, TempDir};

/// Creates a new temporary file that gets cleaned up when dropped.
pub fn create_temp_file() -> Result<NamedTempFile, io::Error> {
  NamedTempFile::new()
}

/// Creates a new temporary directory that gets cleaned up when dropped.
pub fn create_temp_dir() -> Result<TempDir, io::Error> {
  tempfile::tempdir()
}

/// Gets the last modified time of the file or directory at `path`, or [`SystemTime::UNIX_EPOCH`] if nothing exists
/// at `path`.
pub fn modified(path: impl AsRef<Path>) -> Result<SystemTime, io::Error> {
  let modified = match fs::metadata(path) {
    Err(e) if e.kind() == io::ErrorKind::NotFound => SystemTime::UNIX_EPOCH,
    Err(e) => Err(e)?,
    Ok(m) => m.modified()?
  };
  Ok(modified)
}

/// Keeps writing `contents` to file at `path` until its last modified time changes, then returns the new modified
/// time.
pub fn write_until_modified(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<SystemTime, io::Error> {
  let path = path.as_ref();
  let contents = contents.as_ref();
  let previous = modified(path)?;
  // Keep writing to file until its modified time changes, because some modified time implementations have low
  // precision and do not change after writing in quick succession.
  loop {
    fs::write(path, contents)?;
    let current = modified(path)?;
    if previous != current { return Ok(current); }
  }
}

/// Sets the last modified time of the existing file at `path` to `time`, returning the modified time as reported by
/// the filesystem afterwards.
pub fn set_modified(path: impl AsRef<Path>, time: SystemTime) -> Result<SystemTime, io::Error> {
  let path = path.as_ref();
  File::options().write(true).open(path)?.set_modified(time)?;
  modified(path)
}

/// Blocks until the system clock has moved far enough that a freshly written file gets a different modified time than
/// a file written before calling this function.
pub fn wait_until_modified_time_changes() -> Result<(), io::Error> {
  let temp_file = create_temp_file()?;
  write_until_modified(temp_file.path(), "wait")?;
  Ok(())
}

/// Returns `time` shifted by whole `seconds`.
pub fn plus_seconds(time: SystemTime, seconds: u64) -> SystemTime {
  time + Duration::from_secs(seconds)
}
