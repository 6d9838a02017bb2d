use std::io;
use std::path::Path;
use std::time::SystemTime;

use crate::cache::Verdict;
use crate::error::{CacheWriteError, ConfigurationError, GenerationError, InspectionError};
use crate::fingerprint::Fingerprint;
use crate::key::ResourceKey;

pub mod writing;
pub mod event;
pub mod log;

/// Regeneration event tracker. Can be used to implement logging, event tracing, progress tracking, metrics, etc.
///
/// Every error that is recovered from (failed inspections, failed marker writes, degraded fingerprints) is reported
/// through this trait, so that degraded caching can be diagnosed without failing the build.
#[allow(unused_variables)]
pub trait Tracker {
  /// Start: a new batch of inputs.
  #[inline]
  fn batch_start(&mut self) {}
  /// End: completed batch.
  #[inline]
  fn batch_end(&mut self) {}

  /// Start: check whether `key` must be regenerated.
  #[inline]
  fn check_start(&mut self, key: &ResourceKey) {}
  /// End: checked `key`, resulting in a `verdict`, or an error if the marker or a dependency could not be inspected.
  #[inline]
  fn check_end(&mut self, key: &ResourceKey, verdict: Result<&Verdict, &io::Error>) {}

  /// Warning: `fingerprint` of `key` was derived in degraded mode and may collide with other keys.
  #[inline]
  fn fingerprint_degraded(&mut self, key: &ResourceKey, fingerprint: &Fingerprint) {}
  /// Warning: the last modified instant of `key` could not be determined; it is considered unmodified.
  #[inline]
  fn inspection_failed(&mut self, key: &ResourceKey, error: &InspectionError) {}
  /// Error: no arguments could be derived for `key`; it is not generated.
  #[inline]
  fn misconfigured(&mut self, key: &ResourceKey, error: &ConfigurationError) {}

  /// Start: invoke the generator for `key` with `args`.
  #[inline]
  fn invoke_start(&mut self, key: &ResourceKey, args: &[String]) {}
  /// End: invoked the generator for `key`, resulting in success or an `error`.
  #[inline]
  fn invoke_end(&mut self, key: &ResourceKey, result: Result<(), &GenerationError>) {}

  /// End: committed the `marker` of `key`, recording an instant, or failed to write it.
  #[inline]
  fn commit_end(&mut self, key: &ResourceKey, marker: &Path, result: Result<SystemTime, &CacheWriteError>) {}
}

/// Implement [`Tracker`] for `()` that does nothing.
impl Tracker for () {}

impl<T: Tracker + ?Sized> Tracker for &mut T {
  #[inline]
  fn batch_start(&mut self) { (**self).batch_start() }
  #[inline]
  fn batch_end(&mut self) { (**self).batch_end() }
  #[inline]
  fn check_start(&mut self, key: &ResourceKey) { (**self).check_start(key) }
  #[inline]
  fn check_end(&mut self, key: &ResourceKey, verdict: Result<&Verdict, &io::Error>) {
    (**self).check_end(key, verdict)
  }
  #[inline]
  fn fingerprint_degraded(&mut self, key: &ResourceKey, fingerprint: &Fingerprint) {
    (**self).fingerprint_degraded(key, fingerprint)
  }
  #[inline]
  fn inspection_failed(&mut self, key: &ResourceKey, error: &InspectionError) {
    (**self).inspection_failed(key, error)
  }
  #[inline]
  fn misconfigured(&mut self, key: &ResourceKey, error: &ConfigurationError) { (**self).misconfigured(key, error) }
  #[inline]
  fn invoke_start(&mut self, key: &ResourceKey, args: &[String]) { (**self).invoke_start(key, args) }
  #[inline]
  fn invoke_end(&mut self, key: &ResourceKey, result: Result<(), &GenerationError>) {
    (**self).invoke_end(key, result)
  }
  #[inline]
  fn commit_end(&mut self, key: &ResourceKey, marker: &Path, result: Result<SystemTime, &CacheWriteError>) {
    (**self).commit_end(key, marker, result)
  }
}

/// A [`Tracker`] that forwards events to two [`Tracker`]s.
#[derive(Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug)]
pub struct CompositeTracker<A1, A2>(pub A1, pub A2);
impl<A1, A2> CompositeTracker<A1, A2> {
  pub fn new(tracker_1: A1, tracker_2: A2) -> Self { Self(tracker_1, tracker_2) }
}
impl<A1: Tracker, A2: Tracker> Tracker for CompositeTracker<A1, A2> {
  #[inline]
  fn batch_start(&mut self) {
    self.0.batch_start();
    self.1.batch_start();
  }
  #[inline]
  fn batch_end(&mut self) {
    self.0.batch_end();
    self.1.batch_end();
  }

  #[inline]
  fn check_start(&mut self, key: &ResourceKey) {
    self.0.check_start(key);
    self.1.check_start(key);
  }
  #[inline]
  fn check_end(&mut self, key: &ResourceKey, verdict: Result<&Verdict, &io::Error>) {
    self.0.check_end(key, verdict);
    self.1.check_end(key, verdict);
  }

  #[inline]
  fn fingerprint_degraded(&mut self, key: &ResourceKey, fingerprint: &Fingerprint) {
    self.0.fingerprint_degraded(key, fingerprint);
    self.1.fingerprint_degraded(key, fingerprint);
  }
  #[inline]
  fn inspection_failed(&mut self, key: &ResourceKey, error: &InspectionError) {
    self.0.inspection_failed(key, error);
    self.1.inspection_failed(key, error);
  }
  #[inline]
  fn misconfigured(&mut self, key: &ResourceKey, error: &ConfigurationError) {
    self.0.misconfigured(key, error);
    self.1.misconfigured(key, error);
  }

  #[inline]
  fn invoke_start(&mut self, key: &ResourceKey, args: &[String]) {
    self.0.invoke_start(key, args);
    self.1.invoke_start(key, args);
  }
  #[inline]
  fn invoke_end(&mut self, key: &ResourceKey, result: Result<(), &GenerationError>) {
    self.0.invoke_end(key, result);
    self.1.invoke_end(key, result);
  }

  #[inline]
  fn commit_end(&mut self, key: &ResourceKey, marker: &Path, result: Result<SystemTime, &CacheWriteError>) {
    self.0.commit_end(key, marker, result);
    self.1.commit_end(key, marker, result);
  }
}
