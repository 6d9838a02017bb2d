//! Incremental regeneration of source code from service descriptions.
//!
//! A [`Cache`] decides whether generated output for an [`Input`] is stale, by comparing the last modified instant of
//! the input and its dependencies against a marker file that was touched after the last successful generation. A
//! [`Driver`] runs an [`Invoker`] for every stale input of a batch and commits the inputs that were generated.
//!
//! ```no_run
//! use regen::{Cache, Driver, ProcessInvoker, WsImportConfig};
//! use regen::config::CacheConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let base_dir = std::env::current_dir()?;
//! let store = CacheConfig::default().resolve(&base_dir).open_store()?;
//! let wsimport = WsImportConfig::default().resolve(&base_dir);
//! let inputs = wsimport.inputs()?;
//! let mut driver = Driver::new(Cache::new(store));
//! let mut invoker = ProcessInvoker::new("wsimport");
//! let report = driver.run(&inputs, &mut invoker, |input| wsimport.args_for(input));
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub use cache::{Cache, Input, Reason, Verdict};
pub use driver::{Driver, Outcome, Report};
pub use error::{CacheWriteError, ConfigurationError, GenerationError, InspectionError};
pub use fingerprint::{DefaultFingerprinter, Fingerprint, Fingerprinter};
pub use invoke::{Invoker, ProcessInvoker};
pub use key::ResourceKey;
pub use source::ModificationSource;
pub use store::StalenessStore;
pub use wsgen::WsGenConfig;
pub use wsimport::{Invocation, WsImportConfig};

pub mod cache;
pub mod config;
pub mod driver;
pub mod error;
pub mod fingerprint;
pub mod fs;
pub mod invoke;
pub mod key;
pub mod source;
pub mod store;
pub mod tracker;
pub mod wsgen;
pub mod wsimport;
