use std::fs::{create_dir_all, write};
use std::time::{Duration, SystemTime};

use assert_matches::assert_matches;
use testresult::TestResult;

use dev_util::{create_temp_dir, modified, plus_seconds, set_modified, wait_until_modified_time_changes, write_until_modified};
use regen::{Cache, GenerationError, Input, Outcome, Reason, ResourceKey, StalenessStore, Verdict, WsImportConfig};
use regen::fingerprint::{Fingerprinter, SegmentFingerprinter};
use regen::tracker::event::EventTracker;

use crate::util::{new_test_driver, TestDriverExt};

mod util;

#[test]
fn test_wsdl_regenerated_only_when_modified() -> TestResult {
  let temp_dir = create_temp_dir()?;
  let wsdl_dir = temp_dir.path().join("proj/src/wsdl");
  create_dir_all(&wsdl_dir)?;
  let wsdl = wsdl_dir.join("a.wsdl");
  write(&wsdl, "<definitions/>")?;
  let key = ResourceKey::from_path(&wsdl)?;
  let inputs = vec![Input::local_file(key.clone(), &wsdl)];
  let store_dir = temp_dir.path().join("proj/target/jaxws/stale");
  let mut driver = new_test_driver(&store_dir);

  driver.run_then_assert(&inputs, |t| {
    assert_eq!(t.last_verdict_of(&key), Some(&Verdict::Stale(Reason::NoMarker)));
    assert!(t.one_invoke_of(&key));
    assert!(t.any_commit_of(&key));
  });
  let marker = driver.cache_mut().marker_path(&key);
  assert!(marker.is_file());
  assert_eq!(marker.parent(), Some(store_dir.as_path()));

  driver.run_then_assert_no_invoke(&inputs, &key);

  // Move the marker back so that touching the WSDL one second after it is not in the future.
  let marker_time = modified(&marker)? - Duration::from_secs(2);
  set_modified(&marker, marker_time)?;
  set_modified(&wsdl, plus_seconds(marker_time, 1))?;
  driver.run_then_assert(&inputs, |t| {
    assert_matches!(t.last_verdict_of(&key), Some(Verdict::Stale(Reason::ResourceModified { .. })));
    assert!(t.one_invoke_of(&key));
  });
  driver.run_then_assert_no_invoke(&inputs, &key);
  Ok(())
}

#[test]
fn test_binding_change_regenerates_every_wsdl() -> TestResult {
  let temp_dir = create_temp_dir()?;
  let wsdl_dir = temp_dir.path().join("src/wsdl");
  let binding_dir = temp_dir.path().join("src/jaxws");
  create_dir_all(&wsdl_dir)?;
  create_dir_all(&binding_dir)?;
  write(wsdl_dir.join("a.wsdl"), "<definitions/>")?;
  write(wsdl_dir.join("b.wsdl"), "<definitions/>")?;
  let binding = binding_dir.join("bindings.xml");
  write(&binding, "<bindings/>")?;
  let config = WsImportConfig::default().resolve(temp_dir.path());
  let inputs = config.inputs()?;
  assert_eq!(inputs.len(), 2);
  assert!(inputs.iter().all(|i| i.dependencies == vec![binding.clone()]));
  let mut driver = new_test_driver(temp_dir.path().join("target/jaxws/stale"));

  let report = driver.run_then_assert(&inputs, |_| {});
  assert_eq!(report.generated().count(), 2);
  let report = driver.run_then_assert(&inputs, |_| {});
  assert_eq!(report.up_to_date().count(), 2);

  wait_until_modified_time_changes()?;
  write_until_modified(&binding, "<bindings version=\"2.1\"/>")?;
  driver.run_then_assert(&inputs, |t| {
    for input in &inputs {
      assert_matches!(t.last_verdict_of(&input.key), Some(Verdict::Stale(Reason::DependencyModified { path, .. })) => {
        assert_eq!(path, &binding);
      });
      assert!(t.one_invoke_of(&input.key));
    }
  });
  Ok(())
}

#[test]
fn test_dependency_at_marker_time_is_not_modified() -> TestResult {
  let temp_dir = create_temp_dir()?;
  let wsdl = temp_dir.path().join("a.wsdl");
  let dependency = temp_dir.path().join("bindings.xml");
  write(&wsdl, "<definitions/>")?;
  write(&dependency, "<bindings/>")?;
  let key = ResourceKey::from_path(&wsdl)?;
  let inputs = vec![Input::local_file(key.clone(), &wsdl).with_dependencies([dependency.clone()])];
  let mut driver = new_test_driver(temp_dir.path().join("stale"));

  driver.run_then_assert_one_invoke(&inputs, &key);
  let marker_time = modified(driver.cache_mut().marker_path(&key))?;
  set_modified(&dependency, marker_time)?;
  driver.run_then_assert_no_invoke(&inputs, &key);
  set_modified(&dependency, plus_seconds(marker_time, 1))?;
  driver.run_then_assert_one_invoke(&inputs, &key);
  Ok(())
}

#[test]
fn test_failed_generation_is_retried() -> TestResult {
  let temp_dir = create_temp_dir()?;
  let key = ResourceKey::parse("http://example.com/services/a.wsdl")?;
  let inputs = vec![Input::new(key.clone(), regen::source::Known(None))];
  let mut driver = new_test_driver(temp_dir.path().join("stale"));

  let mut failing = |_: &ResourceKey, _: &[String]| -> Result<(), GenerationError> {
    Err(GenerationError::Other("no network".to_string()))
  };
  let report = driver.run(&inputs, &mut failing, |input| Ok(vec![input.key.to_string()]));
  assert_matches!(report.outcome_of(&key), Some(Outcome::Failed(GenerationError::Other(message))) => {
    assert_eq!(message, "no network");
  });
  assert!(!driver.cache_mut().marker_path(&key).exists());

  driver.run_then_assert_one_invoke(&inputs, &key);
  driver.run_then_assert_no_invoke(&inputs, &key);
  Ok(())
}

#[test]
fn test_degraded_fingerprint_still_caches() -> TestResult {
  let temp_dir = create_temp_dir()?;
  let key = ResourceKey::parse("http://example.com/services/a.wsdl")?;
  let fingerprint = SegmentFingerprinter.fingerprint(&key);
  assert!(fingerprint.is_degraded());
  assert_eq!(fingerprint.as_str(), "a-wsdl");

  let store = StalenessStore::new(temp_dir.path());
  let mut cache = Cache::with_fingerprinter(store, SegmentFingerprinter, EventTracker::default());
  let input = Input::new(key.clone(), regen::source::Known(None));
  assert!(cache.is_stale(&input)?);
  assert!(cache.tracker().any_fingerprint_degraded_of(&key));
  cache.commit(&key, SystemTime::now())?;
  assert!(temp_dir.path().join("a-wsdl").is_file());
  assert!(!cache.is_stale(&input)?);
  Ok(())
}
