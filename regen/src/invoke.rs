use std::path::PathBuf;
use std::process::Command;

use crate::error::GenerationError;
use crate::key::ResourceKey;

/// Runs an external generator for an input. The generator must be idempotent given identical arguments and inputs.
pub trait Invoker {
  /// Runs the generator for the input identified by `key` with `args`.
  ///
  /// # Errors
  ///
  /// Returns an error if the generator failed.
  fn invoke(&mut self, key: &ResourceKey, args: &[String]) -> Result<(), GenerationError>;
}

impl<F: FnMut(&ResourceKey, &[String]) -> Result<(), GenerationError>> Invoker for F {
  #[inline]
  fn invoke(&mut self, key: &ResourceKey, args: &[String]) -> Result<(), GenerationError> { self(key, args) }
}


/// [`Invoker`] that runs `program` as a child process with `leading_args` followed by the arguments for an input, and
/// blocks until it exits. Exit status 0 is success; anything else is a failure carrying the captured standard error.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ProcessInvoker {
  program: String,
  leading_args: Vec<String>,
  working_dir: Option<PathBuf>,
}

impl ProcessInvoker {
  #[inline]
  pub fn new(program: impl Into<String>) -> Self {
    Self { program: program.into(), leading_args: Vec::new(), working_dir: None }
  }
  /// Sets arguments that precede the arguments of every input, for example the main class of a generator running on
  /// a virtual machine.
  #[inline]
  pub fn with_leading_args(mut self, leading_args: impl IntoIterator<Item=impl Into<String>>) -> Self {
    self.leading_args = leading_args.into_iter().map(Into::into).collect();
    self
  }
  #[inline]
  pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
    self.working_dir = Some(working_dir.into());
    self
  }

  #[inline]
  pub fn program(&self) -> &str { &self.program }
  #[inline]
  pub fn leading_args(&self) -> &[String] { &self.leading_args }

  fn command(&self, args: &[String]) -> Command {
    let mut command = Command::new(&self.program);
    command.args(&self.leading_args).args(args);
    if let Some(working_dir) = &self.working_dir {
      command.current_dir(working_dir);
    }
    command
  }
}

impl Invoker for ProcessInvoker {
  fn invoke(&mut self, _key: &ResourceKey, args: &[String]) -> Result<(), GenerationError> {
    let output = self.command(args).output()
      .map_err(|error| GenerationError::Spawn { program: self.program.clone(), error })?;
    if output.status.success() {
      Ok(())
    } else {
      let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
      Err(GenerationError::Failed { status: output.status, stderr })
    }
  }
}
