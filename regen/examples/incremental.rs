use std::error::Error;
use std::fs::{create_dir_all, write};

use dev_util::{create_temp_dir, write_until_modified};
use regen::{Cache, Driver, GenerationError, ResourceKey, StalenessStore, WsImportConfig};
use regen::tracker::writing::WritingTracker;

fn main() -> Result<(), Box<dyn Error>> {
  let temp_dir = create_temp_dir()?;
  let wsdl_dir = temp_dir.path().join("src/wsdl");
  create_dir_all(&wsdl_dir)?;
  let wsdl_path = wsdl_dir.join("hello.wsdl");
  write(&wsdl_path, "<definitions name=\"Hello\"/>")?;

  let config = WsImportConfig::default().resolve(temp_dir.path());
  let inputs = config.inputs()?;
  let store = StalenessStore::open(temp_dir.path().join("target/jaxws/stale"))?;
  let mut driver = Driver::new(Cache::with_tracker(store, WritingTracker::with_stdout()));

  // Pretend to be the generator, printing the arguments it would receive.
  let mut invoker = |_: &ResourceKey, args: &[String]| {
    println!("wsimport {}", args.join(" "));
    Ok::<(), GenerationError>(())
  };

  // Generated because there is no marker yet.
  let report = driver.run(&inputs, &mut invoker, |input| config.args_for(input));
  println!("A: generated {}", report.generated().count());

  // Not generated, because the WSDL has not changed.
  let report = driver.run(&inputs, &mut invoker, |input| config.args_for(input));
  println!("B: generated {}", report.generated().count());

  // Generated because the modified time of the WSDL has changed (even though its contents have not).
  write_until_modified(&wsdl_path, "<definitions name=\"Hello\"/>")?;
  let report = driver.run(&inputs, &mut invoker, |input| config.args_for(input));
  println!("C: generated {}", report.generated().count());

  Ok(())
}
