use std::io::{self, BufWriter, Stderr, Stdout, Write};
use std::path::Path;
use std::time::SystemTime;

use crate::cache::{Reason, Verdict};
use crate::error::{CacheWriteError, ConfigurationError, GenerationError, InspectionError};
use crate::fingerprint::Fingerprint;
use crate::key::ResourceKey;
use crate::tracker::Tracker;

/// A [`Tracker`] that writes events to a [`Write`] instance, for example [`Stdout`].
#[derive(Clone, Debug)]
pub struct WritingTracker<W> {
  writer: W,
  indentation: u32,
}

impl WritingTracker<BufWriter<Stdout>> {
  /// Creates a [`WritingTracker`] that writes to buffered standard output.
  pub fn with_stdout() -> Self { Self::new(BufWriter::new(io::stdout())) }
}
impl WritingTracker<BufWriter<Stderr>> {
  /// Creates a [`WritingTracker`] that writes to buffered standard error.
  pub fn with_stderr() -> Self { Self::new(BufWriter::new(io::stderr())) }
}
impl<W: Write> WritingTracker<W> {
  /// Creates a [`WritingTracker`] that writes to `writer`.
  pub fn new(writer: W) -> Self {
    Self { writer, indentation: 0 }
  }
  /// Gets the writer of this tracker.
  #[inline]
  pub fn writer(&self) -> &W { &self.writer }
  /// Consumes this tracker, returning its writer.
  #[inline]
  pub fn into_writer(self) -> W { self.writer }
}

impl<W: Write> Tracker for WritingTracker<W> {
  #[inline]
  fn batch_start(&mut self) {
    self.writeln(format_args!("Regeneration start"));
    self.indent();
  }
  #[inline]
  fn batch_end(&mut self) {
    self.unindent();
    self.writeln(format_args!("Regeneration end"));
    self.flush();
  }

  #[inline]
  fn check_start(&mut self, key: &ResourceKey) {
    self.writeln(format_args!("? {}", key));
    self.indent();
  }
  #[inline]
  fn check_end(&mut self, _key: &ResourceKey, verdict: Result<&Verdict, &io::Error>) {
    self.unindent();
    match verdict {
      Ok(Verdict::Fresh { marker_time }) => self.writeln(format_args!("✓ up to date [{:?}]", marker_time)),
      Ok(Verdict::Stale(Reason::NoMarker)) => self.writeln(format_args!("☒ no marker")),
      Ok(Verdict::Stale(Reason::ResourceModified { modified, marker_time })) => {
        self.writeln(format_args!("☒ resource modified [{:?} > {:?}]", modified, marker_time))
      }
      Ok(Verdict::Stale(Reason::DependencyModified { path, modified, marker_time })) => {
        self.writeln(format_args!("☒ {} modified [{:?} > {:?}]", path.display(), modified, marker_time))
      }
      Err(e) => self.writeln(format_args!("☒ [error: {}]", e)),
    }
  }

  #[inline]
  fn fingerprint_degraded(&mut self, key: &ResourceKey, fingerprint: &Fingerprint) {
    self.writeln(format_args!("⚠ degraded fingerprint '{}' for {}", fingerprint, key));
  }
  #[inline]
  fn inspection_failed(&mut self, key: &ResourceKey, error: &InspectionError) {
    self.writeln(format_args!("⚠ cannot inspect {}, assuming unmodified [error: {}]", key, error));
  }
  #[inline]
  fn misconfigured(&mut self, key: &ResourceKey, error: &ConfigurationError) {
    self.writeln(format_args!("✗ {} [error: {}]", key, error));
  }

  #[inline]
  fn invoke_start(&mut self, key: &ResourceKey, args: &[String]) {
    self.writeln(format_args!("→ {} {:?}", key, args));
    self.indent();
  }
  #[inline]
  fn invoke_end(&mut self, _key: &ResourceKey, result: Result<(), &GenerationError>) {
    self.unindent();
    match result {
      Ok(()) => self.writeln(format_args!("← generated")),
      Err(e) => self.writeln(format_args!("← failed [error: {}]", e)),
    }
  }

  #[inline]
  fn commit_end(&mut self, _key: &ResourceKey, marker: &Path, result: Result<SystemTime, &CacheWriteError>) {
    match result {
      Ok(time) => self.writeln(format_args!("☑ {} [{:?}]", marker.display(), time)),
      Err(e) => self.writeln(format_args!("⚠ {}", e)),
    }
  }
}

impl<W: Write> WritingTracker<W> {
  #[inline]
  fn writeln(&mut self, args: std::fmt::Arguments) {
    self.write_indentation();
    writeln!(&mut self.writer, "{}", args).ok();
  }
  #[inline]
  fn write_indentation(&mut self) {
    for _ in 0..self.indentation {
      write!(&mut self.writer, " ").ok();
    }
  }
  #[inline]
  fn flush(&mut self) {
    self.writer.flush().ok();
  }

  #[inline]
  fn indent(&mut self) {
    self.indentation = self.indentation.saturating_add(1);
  }
  #[inline]
  fn unindent(&mut self) {
    self.indentation = self.indentation.saturating_sub(1);
  }
}


#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_writes_indented_events() {
    let key = ResourceKey::parse("http://example.com/a.wsdl").expect("failed to create resource key");
    let mut tracker = WritingTracker::new(Vec::new());
    tracker.batch_start();
    tracker.check_start(&key);
    tracker.check_end(&key, Ok(&Verdict::Stale(Reason::NoMarker)));
    tracker.invoke_start(&key, &["-keep".to_string()]);
    tracker.invoke_end(&key, Err(&GenerationError::Other("boom".to_string())));
    tracker.batch_end();

    let output = String::from_utf8(tracker.into_writer()).expect("output is not UTF-8");
    let lines: Vec<_> = output.lines().collect();
    assert_eq!(lines, vec![
      "Regeneration start",
      " ? http://example.com/a.wsdl",
      " ☒ no marker",
      " → http://example.com/a.wsdl [\"-keep\"]",
      " ← failed [error: boom]",
      "Regeneration end",
    ]);
  }
}
