use std::io;
use std::path::Path;
use std::time::SystemTime;

use tracing::{debug, error, info, warn};

use crate::cache::{Reason, Verdict};
use crate::error::{CacheWriteError, ConfigurationError, GenerationError, InspectionError};
use crate::fingerprint::Fingerprint;
use crate::key::ResourceKey;
use crate::tracker::Tracker;

/// A [`Tracker`] that forwards events to [`tracing`]: generation at info level, checks at debug level, and every
/// recovered error at warn level.
#[derive(Default, Copy, Clone, Debug)]
pub struct TracingTracker;

impl Tracker for TracingTracker {
  fn batch_start(&mut self) {
    debug!("regeneration start");
  }
  fn batch_end(&mut self) {
    debug!("regeneration end");
  }

  fn check_start(&mut self, key: &ResourceKey) {
    debug!(%key, "checking");
  }
  fn check_end(&mut self, key: &ResourceKey, verdict: Result<&Verdict, &io::Error>) {
    match verdict {
      Ok(Verdict::Fresh { .. }) => info!(%key, "ignoring: up to date"),
      Ok(Verdict::Stale(Reason::NoMarker)) => debug!(%key, "stale: no marker"),
      Ok(Verdict::Stale(Reason::ResourceModified { .. })) => debug!(%key, "stale: newer than its marker"),
      Ok(Verdict::Stale(Reason::DependencyModified { path, .. })) => {
        debug!(%key, dependency = %path.display(), "stale: dependency newer than the marker")
      }
      Err(e) => warn!(%key, error = %e, "cannot check marker, regenerating"),
    }
  }

  fn fingerprint_degraded(&mut self, key: &ResourceKey, fingerprint: &Fingerprint) {
    warn!(%key, %fingerprint, "could not compute digest, using degraded fingerprint that may collide");
  }
  fn inspection_failed(&mut self, key: &ResourceKey, error: &InspectionError) {
    warn!(%key, %error, "cannot determine last modified time, assuming unmodified");
  }
  fn misconfigured(&mut self, key: &ResourceKey, error: &ConfigurationError) {
    error!(%key, %error, "invalid configuration");
  }

  fn invoke_start(&mut self, key: &ResourceKey, args: &[String]) {
    info!(%key, ?args, "processing");
  }
  fn invoke_end(&mut self, key: &ResourceKey, result: Result<(), &GenerationError>) {
    if let Err(error) = result {
      error!(%key, %error, "generation failed");
    }
  }

  fn commit_end(&mut self, key: &ResourceKey, marker: &Path, result: Result<SystemTime, &CacheWriteError>) {
    match result {
      Ok(_) => debug!(%key, marker = %marker.display(), "marker updated"),
      Err(error) => warn!(%key, %error, "marker has not been updated"),
    }
  }
}
