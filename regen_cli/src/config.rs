use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use regen::{Invocation, ProcessInvoker, WsGenConfig, WsImportConfig};
use regen::config::CacheConfig;

/// Configuration file of the command-line interface.
#[derive(Default, Clone, Eq, PartialEq, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CliConfig {
  pub cache: CacheConfig,
  pub wsimport: Option<WsImportConfig>,
  pub wsgen: Option<WsGenConfig>,
  pub tool: ToolConfig,
}

/// Generator process to run.
#[derive(Clone, Eq, PartialEq, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolConfig {
  pub program: String,
  /// Arguments between virtual machine arguments and generator arguments, for example a class path and main class.
  pub leading_args: Vec<String>,
  pub working_dir: Option<PathBuf>,
}

impl Default for ToolConfig {
  fn default() -> Self {
    Self { program: "java".to_string(), leading_args: Vec::new(), working_dir: None }
  }
}

impl ToolConfig {
  pub fn invoker(&self, base_dir: &Path) -> ProcessInvoker {
    let working_dir = self.working_dir.as_ref()
      .map(|dir| base_dir.join(dir))
      .unwrap_or_else(|| base_dir.to_path_buf());
    ProcessInvoker::new(&self.program).with_working_dir(working_dir)
  }

  /// Returns the complete argument list for `invocation`.
  pub fn argv(&self, invocation: Invocation) -> Vec<String> {
    let mut argv = invocation.jvm_args;
    argv.extend(self.leading_args.iter().cloned());
    argv.extend(invocation.args);
    argv
  }
}

impl CliConfig {
  pub fn from_toml(text: &str) -> anyhow::Result<Self> {
    Ok(toml::from_str(text)?)
  }

  /// Reads the configuration at `path`, or the default configuration if `path` does not exist.
  pub fn read(path: &Path) -> anyhow::Result<Self> {
    if !path.exists() {
      tracing::debug!(path = %path.display(), "no configuration file, using defaults");
      return Ok(Self::default());
    }
    let text = read_to_string(path)
      .with_context(|| format!("failed to read configuration file '{}'", path.display()))?;
    Self::from_toml(&text)
      .with_context(|| format!("failed to parse configuration file '{}'", path.display()))
  }

  /// Returns a copy with relative paths resolved against `base_dir`.
  pub fn resolve(&self, base_dir: &Path) -> Self {
    Self {
      cache: self.cache.resolve(base_dir),
      wsimport: self.wsimport.as_ref().map(|c| c.resolve(base_dir)),
      wsgen: self.wsgen.as_ref().map(|c| c.resolve(base_dir)),
      tool: self.tool.clone(),
    }
  }
}
