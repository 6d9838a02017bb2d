use std::fmt::{Debug, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::CacheWriteError;
use crate::fingerprint::{DefaultFingerprinter, Fingerprint, Fingerprinter};
use crate::fs::modified;
use crate::key::ResourceKey;
use crate::source::{LocalFile, ModificationSource};
use crate::store::{read_timestamp, StalenessStore, touch};
use crate::tracker::Tracker;

/// Build input to check: a primary resource identified by `key`, the `source` that reports when the resource was last
/// modified, and `dependencies` whose modification also invalidates generated output.
pub struct Input {
  pub key: ResourceKey,
  pub source: Box<dyn ModificationSource>,
  pub dependencies: Vec<PathBuf>,
  /// Path of the resource relative to the directory it was found in, if it was found in one.
  pub relative_path: Option<String>,
}

impl Input {
  #[inline]
  pub fn new(key: ResourceKey, source: impl ModificationSource + 'static) -> Self {
    Self { key, source: Box::new(source), dependencies: Vec::new(), relative_path: None }
  }
  /// Creates an input for the local file at `path`, with a [`LocalFile`] source.
  pub fn local_file(key: ResourceKey, path: impl Into<PathBuf>) -> Self {
    Self::new(key, LocalFile::new(path))
  }

  #[inline]
  pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item=PathBuf>) -> Self {
    self.dependencies = dependencies.into_iter().collect();
    self
  }
  #[inline]
  pub fn with_relative_path(mut self, relative_path: impl Into<String>) -> Self {
    self.relative_path = Some(relative_path.into());
    self
  }
}

impl Debug for Input {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Input")
      .field("key", &self.key)
      .field("dependencies", &self.dependencies)
      .field("relative_path", &self.relative_path)
      .finish_non_exhaustive()
  }
}


/// Outcome of checking an [`Input`] against its marker.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Verdict {
  /// Generated output is still valid: nothing changed after `marker_time`.
  Fresh { marker_time: SystemTime },
  /// Generated output must be regenerated.
  Stale(Reason),
}

impl Verdict {
  #[inline]
  pub fn is_stale(&self) -> bool { matches!(self, Self::Stale(_)) }
}

/// Why an [`Input`] is stale.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Reason {
  /// No marker exists: the input was never generated, or its marker was removed.
  NoMarker,
  /// The primary resource was modified after the marker.
  ResourceModified { modified: SystemTime, marker_time: SystemTime },
  /// A dependency was modified after the marker.
  DependencyModified { path: PathBuf, modified: SystemTime, marker_time: SystemTime },
}


/// Staleness cache: decides whether inputs must be regenerated, and records successful generations, using markers in
/// a [`StalenessStore`]. Reports events and recovered errors to tracker `A`.
pub struct Cache<F = DefaultFingerprinter, A = ()> {
  store: StalenessStore,
  fingerprinter: F,
  tracker: A,
}

impl Cache {
  /// Creates a cache on `store` with the [default fingerprinter](DefaultFingerprinter) and no tracker.
  #[inline]
  pub fn new(store: StalenessStore) -> Self {
    Self::with_tracker(store, ())
  }
}

impl<A: Tracker> Cache<DefaultFingerprinter, A> {
  /// Creates a cache on `store` with the [default fingerprinter](DefaultFingerprinter) and `tracker`.
  #[inline]
  pub fn with_tracker(store: StalenessStore, tracker: A) -> Self {
    Self::with_fingerprinter(store, DefaultFingerprinter, tracker)
  }
}

impl<F: Fingerprinter, A: Tracker> Cache<F, A> {
  #[inline]
  pub fn with_fingerprinter(store: StalenessStore, fingerprinter: F, tracker: A) -> Self {
    Self { store, fingerprinter, tracker }
  }

  #[inline]
  pub fn store(&self) -> &StalenessStore { &self.store }
  #[inline]
  pub fn tracker(&self) -> &A { &self.tracker }
  #[inline]
  pub fn tracker_mut(&mut self) -> &mut A { &mut self.tracker }

  /// Derives the fingerprint of `key`, reporting it to the tracker if it is [degraded](Fingerprint::is_degraded).
  pub fn fingerprint(&mut self, key: &ResourceKey) -> Fingerprint {
    let fingerprint = self.fingerprinter.fingerprint(key);
    if fingerprint.is_degraded() {
      self.tracker.fingerprint_degraded(key, &fingerprint);
    }
    fingerprint
  }
  /// Returns the path of the marker for `key`.
  #[inline]
  pub fn marker_path(&mut self, key: &ResourceKey) -> PathBuf {
    let fingerprint = self.fingerprint(key);
    self.store.marker_path(&fingerprint)
  }

  /// Checks whether `input` must be regenerated.
  ///
  /// # Errors
  ///
  /// Returns an error if the marker or a dependency could not be inspected for reasons other than not existing.
  #[inline]
  pub fn check(&mut self, input: &Input) -> Result<Verdict, io::Error> {
    self.check_with(&input.key, input.source.as_ref(), &input.dependencies)
  }
  /// Returns `true` if `input` must be regenerated. See [`check`](Self::check).
  #[inline]
  pub fn is_stale(&mut self, input: &Input) -> Result<bool, io::Error> {
    self.check(input).map(|v| v.is_stale())
  }

  /// Checks whether the resource identified by `key` must be regenerated, given the `source` that reports when the
  /// resource was last modified, and its `dependencies`.
  ///
  /// The resource is stale if it has no marker, if `source` reports a modification strictly after the marker, or if a
  /// dependency was modified strictly after the marker. Equal instants are not a modification. If `source` fails, the
  /// failure is reported to the tracker and the resource is considered unmodified. Dependencies that do not exist are
  /// considered unmodified.
  ///
  /// # Errors
  ///
  /// Returns an error if the marker or a dependency could not be inspected for reasons other than not existing.
  pub fn check_with(
    &mut self,
    key: &ResourceKey,
    source: &dyn ModificationSource,
    dependencies: &[PathBuf],
  ) -> Result<Verdict, io::Error> {
    self.tracker.check_start(key);
    let verdict = self.decide(key, source, dependencies);
    self.tracker.check_end(key, verdict.as_ref());
    verdict
  }

  fn decide(
    &mut self,
    key: &ResourceKey,
    source: &dyn ModificationSource,
    dependencies: &[PathBuf],
  ) -> Result<Verdict, io::Error> {
    let marker = self.marker_path(key);
    let Some(marker_time) = read_timestamp(&marker)? else {
      return Ok(Verdict::Stale(Reason::NoMarker));
    };

    match source.last_modified() {
      Ok(Some(modified)) if modified > marker_time => {
        return Ok(Verdict::Stale(Reason::ResourceModified { modified, marker_time }));
      }
      Ok(_) => {}
      Err(e) => self.tracker.inspection_failed(key, &e),
    }

    for path in dependencies {
      if let Some(modified) = modified(path)? {
        if modified > marker_time {
          let path = path.clone();
          return Ok(Verdict::Stale(Reason::DependencyModified { path, modified, marker_time }));
        }
      }
    }

    Ok(Verdict::Fresh { marker_time })
  }

  /// Records that generation for `key` succeeded at `now`, by creating or refreshing its marker. Returns the instant
  /// recorded in the marker.
  ///
  /// # Errors
  ///
  /// Returns an error if the marker could not be written. This does not invalidate the generation; it only means the
  /// next check will find the input stale. The error is also reported to the tracker.
  pub fn commit(&mut self, key: &ResourceKey, now: SystemTime) -> Result<SystemTime, CacheWriteError> {
    let marker = self.marker_path(key);
    let result = touch(&marker, now).map_err(|error| CacheWriteError { marker: marker.clone(), error });
    self.tracker.commit_end(key, &marker, result.as_ref().map(|t| *t));
    result
  }
}

impl<F, A> Debug for Cache<F, A> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Cache")
      .field("store", &self.store)
      .finish_non_exhaustive()
  }
}

/// Shorthand for checking `key` with an untracked [`Cache`] on `store_dir` using `fingerprinter`.
pub fn is_stale(
  key: &ResourceKey,
  source: &dyn ModificationSource,
  dependencies: &[PathBuf],
  store_dir: impl AsRef<Path>,
  fingerprinter: impl Fingerprinter,
) -> Result<bool, io::Error> {
  let store = StalenessStore::new(store_dir.as_ref());
  Cache::with_fingerprinter(store, fingerprinter, ())
    .check_with(key, source, dependencies)
    .map(|v| v.is_stale())
}

/// Shorthand for committing `key` with an untracked [`Cache`] on `store_dir` using `fingerprinter`.
pub fn commit(
  key: &ResourceKey,
  store_dir: impl AsRef<Path>,
  fingerprinter: impl Fingerprinter,
  now: SystemTime,
) -> Result<SystemTime, CacheWriteError> {
  let store = StalenessStore::new(store_dir.as_ref());
  Cache::with_fingerprinter(store, fingerprinter, ()).commit(key, now)
}
