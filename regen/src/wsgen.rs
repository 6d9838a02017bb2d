use std::path::{Path, PathBuf};

use crate::config::resolve_path;
use crate::wsimport::{common_args, CommonArgs, Invocation, push_flag, push_pair};

/// Configuration of Java-to-WSDL generation for a service endpoint implementation (SEI) class.
///
/// Endpoint classes are not files, so they are always regenerated.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct WsGenConfig {
  /// Fully qualified class names of the endpoint implementations.
  pub sei: Vec<String>,
  pub gen_wsdl: bool,
  pub protocol: Option<String>,
  pub servicename: Option<String>,
  pub portname: Option<String>,
  pub inline_schemas: bool,
  pub xnocompile: bool,
  pub xdonotoverwrite: bool,
  /// External metadata file passed with `-x`.
  pub metadata: Option<PathBuf>,
  /// Directory for generated WSDL and schema files.
  pub resource_dest_dir: PathBuf,

  pub source_dest_dir: Option<PathBuf>,
  pub dest_dir: Option<PathBuf>,
  pub keep: bool,
  pub extension: bool,
  pub verbose: bool,
  pub encoding: Option<String>,
}

impl Default for WsGenConfig {
  fn default() -> Self {
    Self {
      sei: Vec::new(),
      gen_wsdl: true,
      protocol: None,
      servicename: None,
      portname: None,
      inline_schemas: false,
      xnocompile: true,
      xdonotoverwrite: false,
      metadata: None,
      resource_dest_dir: PathBuf::from("target/generated-sources/wsdl"),
      source_dest_dir: None,
      dest_dir: None,
      keep: true,
      extension: false,
      verbose: false,
      encoding: None,
    }
  }
}

impl WsGenConfig {
  /// Returns a copy of this configuration with relative paths resolved against `base_dir`.
  pub fn resolve(&self, base_dir: impl AsRef<Path>) -> Self {
    let base_dir = base_dir.as_ref();
    let resolve = |path: &Option<PathBuf>| path.as_ref().map(|p| resolve_path(base_dir, p));
    Self {
      metadata: resolve(&self.metadata),
      resource_dest_dir: resolve_path(base_dir, &self.resource_dest_dir),
      source_dest_dir: resolve(&self.source_dest_dir),
      dest_dir: resolve(&self.dest_dir),
      ..self.clone()
    }
  }

  /// Builds the generator arguments for endpoint class `sei`, which is the last argument.
  pub fn args(&self, sei: &str) -> Invocation {
    let mut args = Vec::new();
    common_args(&mut args, CommonArgs {
      keep: self.keep,
      source_dest_dir: self.source_dest_dir.as_deref(),
      dest_dir: self.dest_dir.as_deref(),
      encoding: self.encoding.as_deref(),
      extension: self.extension,
      verbose: self.verbose,
      xnocompile: self.xnocompile,
    });

    if self.gen_wsdl {
      match &self.protocol {
        Some(protocol) => args.push(format!("-wsdl:{}", protocol)),
        None => args.push("-wsdl".to_string()),
      }
      push_flag(&mut args, "-inlineSchemas", self.inline_schemas);
      if let Some(servicename) = &self.servicename {
        push_pair(&mut args, "-servicename", servicename);
      }
      if let Some(portname) = &self.portname {
        push_pair(&mut args, "-portname", portname);
      }
      push_pair(&mut args, "-r", self.resource_dest_dir.display());
    }

    push_flag(&mut args, "-Xdonotoverwrite", self.xdonotoverwrite);
    if let Some(metadata) = &self.metadata {
      push_pair(&mut args, "-x", metadata.display());
    }
    args.push(sei.to_string());

    Invocation { jvm_args: Vec::new(), args }
  }

  /// Builds the generator arguments for every configured endpoint class, in order.
  pub fn invocations(&self) -> impl Iterator<Item=(&str, Invocation)> {
    self.sei.iter().map(|sei| (sei.as_str(), self.args(sei)))
  }
}
