use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::ConfigurationError;
use crate::fingerprint::Fingerprint;
use crate::fs::{metadata, modified};

/// Directory of markers: empty files named by a [`Fingerprint`], whose last modified time is the instant at which
/// generation for that fingerprint last succeeded.
///
/// Markers of different fingerprints are independent files. Two processes committing the same fingerprint at the same
/// time are not coordinated: the last writer wins.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct StalenessStore {
  dir: PathBuf,
}

impl StalenessStore {
  /// Creates a store in `dir` without touching the filesystem. The directory is created when the first marker is
  /// written.
  #[inline]
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  /// Creates a store in `dir`, creating the directory if it does not exist.
  ///
  /// # Errors
  ///
  /// Returns an error if the directory cannot be created, or if something other than a directory exists at `dir`.
  pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ConfigurationError> {
    let dir = dir.into();
    match metadata(&dir) {
      Ok(Some(m)) if m.is_dir() => {}
      Ok(Some(_)) => {
        let error = io::Error::new(io::ErrorKind::AlreadyExists, "not a directory");
        return Err(ConfigurationError::StoreDirectory(dir, error));
      }
      Ok(None) => {
        if let Err(e) = fs::create_dir_all(&dir) {
          return Err(ConfigurationError::StoreDirectory(dir, e));
        }
      }
      Err(e) => return Err(ConfigurationError::StoreDirectory(dir, e)),
    }
    Ok(Self { dir })
  }

  #[inline]
  pub fn dir(&self) -> &Path { &self.dir }

  /// Returns the path of the marker for `fingerprint`. Does not touch the filesystem.
  #[inline]
  pub fn marker_path(&self, fingerprint: &Fingerprint) -> PathBuf { marker_path(&self.dir, fingerprint) }
}

/// Returns the path of the marker for `fingerprint` in `store_dir`. Does not touch the filesystem.
#[inline]
pub fn marker_path(store_dir: impl AsRef<Path>, fingerprint: &Fingerprint) -> PathBuf {
  store_dir.as_ref().join(fingerprint.as_str())
}

/// Reads the last modified time of the marker at `path`, returning `Ok(None)` if the marker does not exist.
///
/// # Errors
///
/// Returns an error on any I/O failure other than the marker not existing.
#[inline]
pub fn read_timestamp(path: impl AsRef<Path>) -> Result<Option<SystemTime>, io::Error> {
  modified(path)
}

/// Creates the marker at `path` (and its parent directories) if it does not exist, then sets its last modified time to
/// `now`, or leaves it unchanged if the marker already records a later instant. Returns the last modified time as
/// recorded by the filesystem, which is never earlier than `now` nor earlier than the time recorded before.
///
/// # Errors
///
/// Returns an error if creating the directories or the marker failed, or if its modified time could not be set to an
/// instant at or after `now`.
pub fn touch(path: impl AsRef<Path>, now: SystemTime) -> Result<SystemTime, io::Error> {
  let path = path.as_ref();
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)?;
  }
  let previous = modified(path)?;
  let floor = previous.map_or(now, |previous| previous.max(now));
  // Note: `create(true)` without `truncate` keeps an existing marker in place and only creates a missing one.
  let mut file = File::options().write(true).create(true).truncate(false).open(path)?;
  set_modified_at_least(&mut file, floor)
}

/// Last modified time of an open marker.
trait ModifiedTime {
  fn set_modified(&mut self, time: SystemTime) -> Result<(), io::Error>;
  fn modified(&self) -> Result<SystemTime, io::Error>;
}

impl ModifiedTime for File {
  #[inline]
  fn set_modified(&mut self, time: SystemTime) -> Result<(), io::Error> { File::set_modified(self, time) }
  #[inline]
  fn modified(&self) -> Result<SystemTime, io::Error> { self.metadata()?.modified() }
}

/// Filesystems with a timestamp granularity above two seconds are not supported.
const ROUNDING_ATTEMPTS: u64 = 3;

/// Sets the modified time of `file` to `floor`. If the filesystem truncates it below `floor`, sets whole seconds after
/// `floor` until the recorded time is at least `floor`.
fn set_modified_at_least(file: &mut impl ModifiedTime, floor: SystemTime) -> Result<SystemTime, io::Error> {
  file.set_modified(floor)?;
  let mut recorded = file.modified()?;
  let rounded = round_up_to_second(floor);
  let mut attempt = 0;
  while recorded < floor {
    if attempt == ROUNDING_ATTEMPTS {
      return Err(io::Error::new(
        io::ErrorKind::Other,
        format!("modified time was truncated to {:?}, before {:?}", recorded, floor),
      ));
    }
    file.set_modified(rounded + Duration::from_secs(attempt))?;
    recorded = file.modified()?;
    attempt += 1;
  }
  Ok(recorded)
}

fn round_up_to_second(time: SystemTime) -> SystemTime {
  match time.duration_since(SystemTime::UNIX_EPOCH) {
    Ok(since_epoch) if since_epoch.subsec_nanos() > 0 => {
      SystemTime::UNIX_EPOCH + Duration::from_secs(since_epoch.as_secs() + 1)
    }
    _ => time,
  }
}


#[cfg(test)]
mod test {
  use std::fs::{remove_dir, write};

  use assert_matches::assert_matches;
  use testresult::TestResult;

  use dev_util::{create_temp_dir, plus_seconds};

  use crate::fingerprint::{Fingerprinter, SegmentFingerprinter};
  use crate::key::ResourceKey;

  use super::*;

  fn fingerprint(key: &str) -> Fingerprint {
    SegmentFingerprinter.fingerprint(&ResourceKey::parse(key).expect("failed to create resource key"))
  }

  #[test]
  fn test_marker_path() {
    let fingerprint = fingerprint("http://example.com/a.wsdl");
    let store = StalenessStore::new("/does/not/exist");
    assert_eq!(store.marker_path(&fingerprint), Path::new("/does/not/exist").join("a-wsdl"));
    assert!(!store.dir().exists());
  }

  #[test]
  fn test_read_timestamp_not_found() -> TestResult {
    let temp_dir = create_temp_dir()?;
    assert_matches!(read_timestamp(temp_dir.path().join("marker"))?, None);
    Ok(())
  }

  #[test]
  fn test_touch_creates_parents() -> TestResult {
    let temp_dir = create_temp_dir()?;
    let path = temp_dir.path().join("jaxws").join("stale").join("marker");
    let now = SystemTime::now();
    let recorded = touch(&path, now)?;
    assert!(recorded >= now);
    assert_matches!(read_timestamp(&path)?, Some(timestamp) if timestamp == recorded);
    Ok(())
  }

  #[test]
  fn test_touch_refreshes_existing() -> TestResult {
    let temp_dir = create_temp_dir()?;
    let path = temp_dir.path().join("marker");
    write(&path, "")?;

    let now = SystemTime::now();
    let first = touch(&path, now)?;
    assert!(first >= now);

    let later = plus_seconds(now, 10);
    let second = touch(&path, later)?;
    assert!(second >= later);
    assert!(second > first);
    assert_matches!(read_timestamp(&path)?, Some(timestamp) if timestamp == second);
    Ok(())
  }

  #[test]
  fn test_touch_never_moves_back() -> TestResult {
    let temp_dir = create_temp_dir()?;
    let path = temp_dir.path().join("marker");
    let now = SystemTime::now();
    let first = touch(&path, plus_seconds(now, 10))?;
    let second = touch(&path, now)?;
    assert_eq!(second, first);
    assert_matches!(read_timestamp(&path)?, Some(timestamp) if timestamp == first);
    Ok(())
  }

  /// Stores modified times truncated to even seconds, like FAT.
  struct TwoSecondGranularity(SystemTime);

  impl ModifiedTime for TwoSecondGranularity {
    fn set_modified(&mut self, time: SystemTime) -> Result<(), io::Error> {
      let secs = time.duration_since(SystemTime::UNIX_EPOCH).map_err(io::Error::other)?.as_secs();
      self.0 = SystemTime::UNIX_EPOCH + Duration::from_secs(secs - secs % 2);
      Ok(())
    }
    fn modified(&self) -> Result<SystemTime, io::Error> { Ok(self.0) }
  }

  #[test]
  fn test_coarse_granularity_rounds_up() -> TestResult {
    let mut file = TwoSecondGranularity(SystemTime::UNIX_EPOCH);
    let floor = SystemTime::UNIX_EPOCH + Duration::from_millis(100_500);
    let recorded = set_modified_at_least(&mut file, floor)?;
    assert!(recorded >= floor);
    assert_eq!(recorded, SystemTime::UNIX_EPOCH + Duration::from_secs(102));

    let floor = SystemTime::UNIX_EPOCH + Duration::from_millis(101_500);
    let recorded = set_modified_at_least(&mut file, floor)?;
    assert_eq!(recorded, SystemTime::UNIX_EPOCH + Duration::from_secs(102));
    Ok(())
  }

  #[test]
  fn test_truncation_below_floor_is_an_error() {
    struct Frozen;
    impl ModifiedTime for Frozen {
      fn set_modified(&mut self, _time: SystemTime) -> Result<(), io::Error> { Ok(()) }
      fn modified(&self) -> Result<SystemTime, io::Error> { Ok(SystemTime::UNIX_EPOCH) }
    }
    let floor = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
    assert!(set_modified_at_least(&mut Frozen, floor).is_err());
  }

  #[test]
  fn test_round_up_to_second() {
    let whole = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
    assert_eq!(round_up_to_second(whole), whole);
    let fraction = whole + Duration::from_millis(1);
    assert_eq!(round_up_to_second(fraction), SystemTime::UNIX_EPOCH + Duration::from_secs(101));
  }

  #[test]
  fn test_open() -> TestResult {
    let temp_dir = create_temp_dir()?;
    let dir = temp_dir.path().join("stale");
    let store = StalenessStore::open(&dir)?;
    assert!(store.dir().is_dir());
    // Opening again is fine.
    StalenessStore::open(&dir)?;
    remove_dir(&dir)?;

    write(&dir, "not a directory")?;
    assert_matches!(StalenessStore::open(&dir), Err(ConfigurationError::StoreDirectory(path, _)) if path == dir);
    Ok(())
  }
}
