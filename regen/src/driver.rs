use std::time::SystemTime;

use crate::cache::{Cache, Input, Verdict};
use crate::error::{CacheWriteError, ConfigurationError, GenerationError};
use crate::fingerprint::Fingerprinter;
use crate::invoke::Invoker;
use crate::key::ResourceKey;
use crate::tracker::Tracker;

/// What happened to a single input.
#[derive(Debug)]
pub enum Outcome {
  /// The input was up to date; the generator was not invoked.
  UpToDate,
  /// The generator succeeded. `cache_error` is set if the marker could not be written, which only means the input
  /// will be regenerated next time.
  Generated { cache_error: Option<CacheWriteError> },
  /// No arguments could be derived for the input; the generator was not invoked.
  Misconfigured(ConfigurationError),
  /// The generator failed; no marker was written.
  Failed(GenerationError),
}

impl Outcome {
  /// Returns `true` if this outcome does not fail the build.
  #[inline]
  pub fn is_success(&self) -> bool { matches!(self, Self::UpToDate | Self::Generated { .. }) }
}

/// Outcomes of a batch, in input order.
#[derive(Default, Debug)]
pub struct Report {
  outcomes: Vec<(ResourceKey, Outcome)>,
}

impl Report {
  #[inline]
  pub fn outcomes(&self) -> &[(ResourceKey, Outcome)] { &self.outcomes }
  #[inline]
  pub fn outcome_of(&self, key: &ResourceKey) -> Option<&Outcome> {
    self.outcomes.iter().find(|(k, _)| k == key).map(|(_, o)| o)
  }
  /// Returns the keys of inputs that were generated.
  pub fn generated(&self) -> impl Iterator<Item=&ResourceKey> {
    self.outcomes.iter().filter(|(_, o)| matches!(o, Outcome::Generated { .. })).map(|(k, _)| k)
  }
  /// Returns the keys of inputs that were up to date.
  pub fn up_to_date(&self) -> impl Iterator<Item=&ResourceKey> {
    self.outcomes.iter().filter(|(_, o)| matches!(o, Outcome::UpToDate)).map(|(k, _)| k)
  }
  /// Returns the inputs that failed the build, with their outcome.
  pub fn failures(&self) -> impl Iterator<Item=(&ResourceKey, &Outcome)> {
    self.outcomes.iter().filter(|(_, o)| !o.is_success()).map(|(k, o)| (k, o))
  }
  /// Returns `true` if no input failed the build.
  #[inline]
  pub fn is_success(&self) -> bool { self.failures().next().is_none() }
  #[inline]
  pub fn into_outcomes(self) -> Vec<(ResourceKey, Outcome)> { self.outcomes }
}


/// Drives regeneration of a batch of inputs: check each input against the [`Cache`], invoke the generator for stale
/// inputs, and commit successful generations. Inputs are processed one at a time, in order.
pub struct Driver<F, A> {
  cache: Cache<F, A>,
}

impl<F: Fingerprinter, A: Tracker> Driver<F, A> {
  #[inline]
  pub fn new(cache: Cache<F, A>) -> Self { Self { cache } }

  #[inline]
  pub fn cache(&self) -> &Cache<F, A> { &self.cache }
  #[inline]
  pub fn cache_mut(&mut self) -> &mut Cache<F, A> { &mut self.cache }
  #[inline]
  pub fn into_cache(self) -> Cache<F, A> { self.cache }

  /// Processes `inputs`, deriving the generator arguments of stale inputs with `args`.
  ///
  /// Errors of the cache never fail an input: a check that fails is treated as stale, and a marker that cannot be
  /// written is reported in [`Outcome::Generated`]. Only a failure to derive arguments or a failure of the generator
  /// fails an input, and never the inputs after it.
  pub fn run<'i>(
    &mut self,
    inputs: impl IntoIterator<Item=&'i Input>,
    invoker: &mut impl Invoker,
    mut args: impl FnMut(&Input) -> Result<Vec<String>, ConfigurationError>,
  ) -> Report {
    self.cache.tracker_mut().batch_start();
    let mut report = Report::default();
    for input in inputs {
      let outcome = self.process(input, invoker, &mut args);
      report.outcomes.push((input.key.clone(), outcome));
    }
    self.cache.tracker_mut().batch_end();
    report
  }

  /// Checks every input in `inputs` without invoking the generator, returning the inputs that are stale.
  pub fn stale<'i>(&mut self, inputs: impl IntoIterator<Item=&'i Input>) -> Vec<&'i Input> {
    self.cache.tracker_mut().batch_start();
    let stale = inputs.into_iter()
      .filter(|input| self.cache.check(input).map_or(true, |v| v.is_stale()))
      .collect();
    self.cache.tracker_mut().batch_end();
    stale
  }

  fn process(
    &mut self,
    input: &Input,
    invoker: &mut impl Invoker,
    args: &mut impl FnMut(&Input) -> Result<Vec<String>, ConfigurationError>,
  ) -> Outcome {
    // Note: a failed check has already been reported to the tracker; regenerate to be safe.
    if let Ok(Verdict::Fresh { .. }) = self.cache.check(input) {
      return Outcome::UpToDate;
    }

    let args = match args(input) {
      Ok(args) => args,
      Err(e) => {
        self.cache.tracker_mut().misconfigured(&input.key, &e);
        return Outcome::Misconfigured(e);
      }
    };

    self.cache.tracker_mut().invoke_start(&input.key, &args);
    let result = invoker.invoke(&input.key, &args);
    self.cache.tracker_mut().invoke_end(&input.key, result.as_ref().copied());
    if let Err(e) = result {
      return Outcome::Failed(e);
    }

    let cache_error = self.cache.commit(&input.key, SystemTime::now()).err();
    Outcome::Generated { cache_error }
  }
}


#[cfg(test)]
mod test {
  use std::fs::write;

  use assert_matches::assert_matches;
  use testresult::TestResult;

  use dev_util::{create_temp_dir, wait_until_modified_time_changes, write_until_modified};

  use crate::source::Known;
  use crate::store::StalenessStore;
  use crate::tracker::event::EventTracker;

  use super::*;

  fn key(name: &str) -> ResourceKey {
    ResourceKey::parse(&format!("http://example.com/{}", name)).expect("failed to create resource key")
  }

  fn echo_args(input: &Input) -> Result<Vec<String>, ConfigurationError> {
    Ok(vec![input.key.to_string()])
  }

  #[test]
  fn test_generates_then_skips() -> TestResult {
    let temp_dir = create_temp_dir()?;
    let cache = Cache::with_tracker(StalenessStore::new(temp_dir.path()), EventTracker::default());
    let mut driver = Driver::new(cache);
    let inputs = vec![Input::new(key("a.wsdl"), Known(None)), Input::new(key("b.wsdl"), Known(None))];
    let mut invoked = Vec::new();
    let mut invoker = |key: &ResourceKey, _: &[String]| {
      invoked.push(key.clone());
      Ok::<(), GenerationError>(())
    };

    let report = driver.run(&inputs, &mut invoker, echo_args);
    assert!(report.is_success());
    assert_eq!(report.generated().count(), 2);
    assert_eq!(driver.cache().tracker().invoke_args_of(&key("a.wsdl")), Some(&["http://example.com/a.wsdl".to_string()][..]));

    let report = driver.run(&inputs, &mut invoker, echo_args);
    assert!(report.is_success());
    assert_eq!(report.up_to_date().count(), 2);
    assert!(!driver.cache().tracker().any_invoke_of(&key("a.wsdl")));

    assert_eq!(invoked, vec![key("a.wsdl"), key("b.wsdl")]);
    Ok(())
  }

  #[test]
  fn test_failure_commits_nothing_and_continues() -> TestResult {
    let temp_dir = create_temp_dir()?;
    let cache = Cache::with_tracker(StalenessStore::new(temp_dir.path()), EventTracker::default());
    let mut driver = Driver::new(cache);
    let inputs = vec![Input::new(key("broken.wsdl"), Known(None)), Input::new(key("fine.wsdl"), Known(None))];
    let mut invoker = |key: &ResourceKey, _: &[String]| {
      if key.as_str().ends_with("broken.wsdl") {
        Err(GenerationError::Other("broken".to_string()))
      } else {
        Ok(())
      }
    };

    let report = driver.run(&inputs, &mut invoker, echo_args);
    assert!(!report.is_success());
    assert_matches!(report.outcome_of(&key("broken.wsdl")), Some(Outcome::Failed(_)));
    assert_matches!(report.outcome_of(&key("fine.wsdl")), Some(Outcome::Generated { cache_error: None }));
    assert!(!driver.cache().tracker().any_commit_of(&key("broken.wsdl")));
    assert!(driver.cache().tracker().any_commit_of(&key("fine.wsdl")));

    // Still stale on the next run, because no marker was written.
    let stale = driver.stale(&inputs);
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].key, key("broken.wsdl"));
    Ok(())
  }

  #[test]
  fn test_misconfigured_input_is_not_invoked() -> TestResult {
    let temp_dir = create_temp_dir()?;
    let cache = Cache::with_tracker(StalenessStore::new(temp_dir.path()), EventTracker::default());
    let mut driver = Driver::new(cache);
    let inputs = vec![Input::new(key("a.wsdl"), Known(None))];
    let mut invoker = |_: &ResourceKey, _: &[String]| -> Result<(), GenerationError> {
      panic!("generator must not be invoked");
    };

    let report = driver.run(&inputs, &mut invoker, |_| Err(ConfigurationError::BindingsWithWildcardLocation("*".to_string())));
    assert_matches!(report.outcome_of(&key("a.wsdl")), Some(Outcome::Misconfigured(_)));
    assert!(driver.cache().tracker().any_misconfigured_of(&key("a.wsdl")));
    Ok(())
  }

  #[test]
  fn test_marker_write_failure_does_not_fail_input() -> TestResult {
    let temp_dir = create_temp_dir()?;
    let store_dir = temp_dir.path().join("stale");
    write(&store_dir, "not a directory")?;
    let cache = Cache::with_tracker(StalenessStore::new(&store_dir), EventTracker::default());
    let mut driver = Driver::new(cache);
    let inputs = vec![Input::new(key("a.wsdl"), Known(None))];
    let mut invoker = |_: &ResourceKey, _: &[String]| Ok::<(), GenerationError>(());

    let report = driver.run(&inputs, &mut invoker, echo_args);
    assert!(report.is_success());
    assert_matches!(report.outcome_of(&key("a.wsdl")), Some(Outcome::Generated { cache_error: Some(_) }));
    assert!(driver.cache().tracker().any_commit_failed_of(&key("a.wsdl")));
    Ok(())
  }

  #[test]
  fn test_modified_local_input_is_regenerated() -> TestResult {
    let temp_dir = create_temp_dir()?;
    let wsdl = temp_dir.path().join("a.wsdl");
    write(&wsdl, "<definitions/>")?;
    let key = ResourceKey::from_path(&wsdl)?;
    let cache = Cache::with_tracker(StalenessStore::new(temp_dir.path().join("stale")), EventTracker::default());
    let mut driver = Driver::new(cache);
    let inputs = vec![Input::local_file(key.clone(), &wsdl)];
    let mut invoker = |_: &ResourceKey, _: &[String]| Ok::<(), GenerationError>(());

    driver.run(&inputs, &mut invoker, echo_args);
    assert!(driver.cache().tracker().one_invoke_of(&key));
    driver.run(&inputs, &mut invoker, echo_args);
    assert!(!driver.cache().tracker().any_invoke_of(&key));

    wait_until_modified_time_changes()?;
    write_until_modified(&wsdl, "<definitions name=\"changed\"/>")?;
    driver.run(&inputs, &mut invoker, echo_args);
    assert!(driver.cache().tracker().one_invoke_of(&key));
    Ok(())
  }
}
