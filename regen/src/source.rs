use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::InspectionError;
use crate::fs::modified;

#[cfg(feature = "remote")]
pub mod remote;

/// Capability of a resource to report the instant it was last modified. The caller picks the implementation that fits
/// the resource: [`LocalFile`] for files, [`remote::Remote`] for URLs, [`Known`] when the instant is already known.
pub trait ModificationSource {
  /// Returns the instant the resource was last modified, or `Ok(None)` if the resource cannot report one (for example
  /// because it does not exist, or because a server omits the last modified header).
  ///
  /// # Errors
  ///
  /// Returns an error if inspecting the resource failed.
  fn last_modified(&self) -> Result<Option<SystemTime>, InspectionError>;
}

impl<S: ModificationSource + ?Sized> ModificationSource for &S {
  #[inline]
  fn last_modified(&self) -> Result<Option<SystemTime>, InspectionError> { (**self).last_modified() }
}

impl<S: ModificationSource + ?Sized> ModificationSource for Box<S> {
  #[inline]
  fn last_modified(&self) -> Result<Option<SystemTime>, InspectionError> { self.as_ref().last_modified() }
}

/// [`ModificationSource`] that calls a function, for callers that inspect resources in their own way.
#[derive(Copy, Clone, Debug)]
pub struct FnSource<F>(pub F);

impl<F: Fn() -> Result<Option<SystemTime>, InspectionError>> ModificationSource for FnSource<F> {
  #[inline]
  fn last_modified(&self) -> Result<Option<SystemTime>, InspectionError> { (self.0)() }
}


/// [`ModificationSource`] of a file or directory on the local filesystem, reporting its last modified time.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct LocalFile(pub PathBuf);

impl LocalFile {
  #[inline]
  pub fn new(path: impl Into<PathBuf>) -> Self { Self(path.into()) }
  #[inline]
  pub fn path(&self) -> &Path { &self.0 }
}

impl ModificationSource for LocalFile {
  #[inline]
  fn last_modified(&self) -> Result<Option<SystemTime>, InspectionError> {
    Ok(modified(&self.0)?)
  }
}


/// [`ModificationSource`] with a last modified instant that is known up front, or known to be unknowable.
#[derive(Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Known(pub Option<SystemTime>);

impl ModificationSource for Known {
  #[inline]
  fn last_modified(&self) -> Result<Option<SystemTime>, InspectionError> { Ok(self.0) }
}


#[cfg(test)]
mod test {
  use std::fs::remove_file;
  use std::io;

  use assert_matches::assert_matches;
  use testresult::TestResult;

  use dev_util::{create_temp_file, write_until_modified};

  use super::*;

  #[test]
  fn test_local_file() -> TestResult {
    let temp_file = create_temp_file()?.into_temp_path();
    let path = temp_file.to_path_buf();
    let source = LocalFile::new(&path);

    let stamp = source.last_modified()?;
    assert_matches!(stamp, Some(_));
    assert_eq!(stamp, source.last_modified()?);

    let modified = write_until_modified(&path, "changed")?;
    assert_matches!(source.last_modified()?, Some(m) if m == modified);

    remove_file(&path)?;
    assert_matches!(source.last_modified()?, None);
    Ok(())
  }

  #[test]
  fn test_known() -> TestResult {
    let now = SystemTime::now();
    assert_matches!(Known(Some(now)).last_modified()?, Some(t) if t == now);
    assert_matches!(Known::default().last_modified()?, None);
    Ok(())
  }

  #[test]
  fn test_fn_source() {
    let failing = FnSource(|| -> Result<Option<SystemTime>, InspectionError> {
      Err(io::Error::new(io::ErrorKind::TimedOut, "timed out").into())
    });
    assert_matches!(failing.last_modified(), Err(InspectionError::Io(e)) if e.kind() == io::ErrorKind::TimedOut);
    let boxed: Box<dyn ModificationSource> = Box::new(Known(None));
    assert_matches!(boxed.last_modified(), Ok(None));
  }
}
