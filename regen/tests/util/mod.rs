#![allow(dead_code)]

use std::io::{BufWriter, Stdout};
use std::path::Path;

use regen::{Cache, DefaultFingerprinter, GenerationError, Input, ResourceKey, StalenessStore};
use regen::driver::{Driver, Report};
use regen::tracker::CompositeTracker;
use regen::tracker::event::EventTracker;
use regen::tracker::writing::WritingTracker;

/// Testing tracker composed of an [`EventTracker`] for testing and stdout [`WritingTracker`] for debugging.
pub type TestTracker = CompositeTracker<EventTracker, WritingTracker<BufWriter<Stdout>>>;
pub fn new_test_tracker() -> TestTracker {
  CompositeTracker(EventTracker::default(), WritingTracker::with_stdout())
}

/// Testing [`Driver`] using [`TestTracker`].
pub type TestDriver = Driver<DefaultFingerprinter, TestTracker>;
pub fn new_test_driver(store_dir: impl AsRef<Path>) -> TestDriver {
  Driver::new(Cache::with_tracker(StalenessStore::new(store_dir.as_ref()), new_test_tracker()))
}

/// Testing extensions for [`TestDriver`].
pub trait TestDriverExt {
  /// Runs `inputs` with a generator that always succeeds, then runs `test_assert_func` on the event tracker.
  fn run_then_assert(&mut self, inputs: &[Input], test_assert_func: impl FnOnce(&EventTracker)) -> Report;

  /// Runs `inputs`, then asserts that `key` was generated exactly once.
  fn run_then_assert_one_invoke(&mut self, inputs: &[Input], key: &ResourceKey) -> Report {
    self.run_then_assert(inputs, |t|
      assert!(t.one_invoke_of(key), "expected one invocation for {}, but it was not invoked, or invoked more than once", key),
    )
  }
  /// Runs `inputs`, then asserts that `key` was not generated.
  fn run_then_assert_no_invoke(&mut self, inputs: &[Input], key: &ResourceKey) -> Report {
    self.run_then_assert(inputs, |t|
      assert!(!t.any_invoke_of(key), "expected no invocation for {}, but it was invoked", key),
    )
  }
}
impl TestDriverExt for TestDriver {
  fn run_then_assert(&mut self, inputs: &[Input], test_assert_func: impl FnOnce(&EventTracker)) -> Report {
    let mut invoker = |_: &ResourceKey, _: &[String]| Ok::<(), GenerationError>(());
    let report = self.run(inputs, &mut invoker, |input| Ok(vec![input.key.to_string()]));
    assert!(report.is_success(), "expected a successful run, but some inputs failed: {:?}", report);
    test_assert_func(&self.cache().tracker().0);
    report
  }
}
