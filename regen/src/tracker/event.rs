use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::cache::Verdict;
use crate::error::{CacheWriteError, ConfigurationError, GenerationError, InspectionError};
use crate::fingerprint::Fingerprint;
use crate::key::ResourceKey;
use crate::tracker::Tracker;

/// A [`Tracker`] that stores [`Event`]s in a [`Vec`], useful in testing to assert that inputs are regenerated exactly
/// when they should be.
#[derive(Clone, Debug)]
pub struct EventTracker {
  events: Vec<Event>,
  clear_on_batch_start: bool,
}

impl Default for EventTracker {
  fn default() -> Self {
    Self { events: Vec::new(), clear_on_batch_start: true }
  }
}

/// Enumeration of important regeneration events. Errors are stored as their messages.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Event {
  BatchStart,
  BatchEnd,

  CheckStart { key: ResourceKey },
  CheckEnd { key: ResourceKey, verdict: Result<Verdict, String> },

  FingerprintDegraded { key: ResourceKey, fingerprint: Fingerprint },
  InspectionFailed { key: ResourceKey, error: String },
  Misconfigured { key: ResourceKey, error: String },

  InvokeStart { key: ResourceKey, args: Vec<String> },
  InvokeEnd { key: ResourceKey, error: Option<String> },

  CommitEnd { key: ResourceKey, marker: PathBuf, result: Result<SystemTime, String> },
}

impl Event {
  /// Returns the key this event is about, or `None` for batch events.
  pub fn key(&self) -> Option<&ResourceKey> {
    match self {
      Event::BatchStart | Event::BatchEnd => None,
      Event::CheckStart { key }
      | Event::CheckEnd { key, .. }
      | Event::FingerprintDegraded { key, .. }
      | Event::InspectionFailed { key, .. }
      | Event::Misconfigured { key, .. }
      | Event::InvokeStart { key, .. }
      | Event::InvokeEnd { key, .. }
      | Event::CommitEnd { key, .. } => Some(key),
    }
  }
  #[inline]
  fn is_about(&self, key: &ResourceKey) -> bool { self.key() == Some(key) }
}

impl Tracker for EventTracker {
  #[inline]
  fn batch_start(&mut self) {
    if self.clear_on_batch_start {
      self.events.clear();
    }
    self.events.push(Event::BatchStart);
  }
  #[inline]
  fn batch_end(&mut self) {
    self.events.push(Event::BatchEnd);
  }

  #[inline]
  fn check_start(&mut self, key: &ResourceKey) {
    self.events.push(Event::CheckStart { key: key.clone() });
  }
  #[inline]
  fn check_end(&mut self, key: &ResourceKey, verdict: Result<&Verdict, &io::Error>) {
    let verdict = verdict.map(Clone::clone).map_err(ToString::to_string);
    self.events.push(Event::CheckEnd { key: key.clone(), verdict });
  }

  #[inline]
  fn fingerprint_degraded(&mut self, key: &ResourceKey, fingerprint: &Fingerprint) {
    self.events.push(Event::FingerprintDegraded { key: key.clone(), fingerprint: fingerprint.clone() });
  }
  #[inline]
  fn inspection_failed(&mut self, key: &ResourceKey, error: &InspectionError) {
    self.events.push(Event::InspectionFailed { key: key.clone(), error: error.to_string() });
  }
  #[inline]
  fn misconfigured(&mut self, key: &ResourceKey, error: &ConfigurationError) {
    self.events.push(Event::Misconfigured { key: key.clone(), error: error.to_string() });
  }

  #[inline]
  fn invoke_start(&mut self, key: &ResourceKey, args: &[String]) {
    self.events.push(Event::InvokeStart { key: key.clone(), args: args.to_vec() });
  }
  #[inline]
  fn invoke_end(&mut self, key: &ResourceKey, result: Result<(), &GenerationError>) {
    self.events.push(Event::InvokeEnd { key: key.clone(), error: result.err().map(ToString::to_string) });
  }

  #[inline]
  fn commit_end(&mut self, key: &ResourceKey, marker: &Path, result: Result<SystemTime, &CacheWriteError>) {
    let result = result.map_err(ToString::to_string);
    self.events.push(Event::CommitEnd { key: key.clone(), marker: marker.to_path_buf(), result });
  }
}

impl EventTracker {
  /// Creates a tracker that keeps events of previous batches when a new batch starts.
  #[inline]
  pub fn without_clear_on_batch_start() -> Self {
    Self { clear_on_batch_start: false, ..Self::default() }
  }

  /// Returns a slice over all events.
  #[inline]
  pub fn slice(&self) -> &[Event] { &self.events }
  /// Returns an iterator over all events.
  #[inline]
  pub fn iter(&self) -> impl Iterator<Item=&Event> { self.events.iter() }
  /// Returns an iterator over all events about `key`.
  #[inline]
  pub fn iter_of<'a>(&'a self, key: &'a ResourceKey) -> impl Iterator<Item=&'a Event> + 'a {
    self.events.iter().filter(move |e| e.is_about(key))
  }
  #[inline]
  pub fn clear(&mut self) { self.events.clear(); }

  /// Returns the verdict of the last successful check of `key`.
  pub fn last_verdict_of(&self, key: &ResourceKey) -> Option<&Verdict> {
    self.events.iter().filter(|e| e.is_about(key)).filter_map(|e| match e {
      Event::CheckEnd { verdict: Ok(verdict), .. } => Some(verdict),
      _ => None,
    }).last()
  }
  /// Returns the number of generator invocations for `key`.
  pub fn invoke_count_of(&self, key: &ResourceKey) -> usize {
    self.iter_of(key).filter(|e| matches!(e, Event::InvokeStart { .. })).count()
  }
  /// Returns `true` if the generator was invoked for `key`.
  #[inline]
  pub fn any_invoke_of(&self, key: &ResourceKey) -> bool { self.invoke_count_of(key) > 0 }
  /// Returns `true` if the generator was invoked exactly once for `key`.
  #[inline]
  pub fn one_invoke_of(&self, key: &ResourceKey) -> bool { self.invoke_count_of(key) == 1 }
  /// Returns the arguments of the first generator invocation for `key`.
  pub fn invoke_args_of(&self, key: &ResourceKey) -> Option<&[String]> {
    self.events.iter().filter(|e| e.is_about(key)).find_map(|e| match e {
      Event::InvokeStart { args, .. } => Some(args.as_slice()),
      _ => None,
    })
  }
  /// Returns `true` if a marker for `key` was written successfully.
  pub fn any_commit_of(&self, key: &ResourceKey) -> bool {
    self.iter_of(key).any(|e| matches!(e, Event::CommitEnd { result: Ok(_), .. }))
  }
  /// Returns `true` if writing a marker for `key` failed.
  pub fn any_commit_failed_of(&self, key: &ResourceKey) -> bool {
    self.iter_of(key).any(|e| matches!(e, Event::CommitEnd { result: Err(_), .. }))
  }
  /// Returns `true` if inspecting `key` failed.
  pub fn any_inspection_failed_of(&self, key: &ResourceKey) -> bool {
    self.iter_of(key).any(|e| matches!(e, Event::InspectionFailed { .. }))
  }
  /// Returns `true` if a degraded fingerprint was derived for `key`.
  pub fn any_fingerprint_degraded_of(&self, key: &ResourceKey) -> bool {
    self.iter_of(key).any(|e| matches!(e, Event::FingerprintDegraded { .. }))
  }
  /// Returns `true` if no arguments could be derived for `key`.
  pub fn any_misconfigured_of(&self, key: &ResourceKey) -> bool {
    self.iter_of(key).any(|e| matches!(e, Event::Misconfigured { .. }))
  }
}
