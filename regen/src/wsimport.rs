use std::ffi::OsStr;
use std::fs::read_dir;
use std::io;
use std::path::{Path, PathBuf};

use url::Url;

use crate::cache::Input;
use crate::config::{ProxySettings, resolve_path};
use crate::error::ConfigurationError;
use crate::key::ResourceKey;

/// Arguments for one generator run: arguments for the virtual machine hosting the generator, and arguments for the
/// generator itself. Every string is a single argv entry; nothing is quoted.
#[derive(Default, Clone, Eq, PartialEq, Debug)]
pub struct Invocation {
  pub jvm_args: Vec<String>,
  pub args: Vec<String>,
}

impl Invocation {
  /// Appends the location of `input` as the final argument.
  #[inline]
  pub fn with_input(mut self, input: &Input) -> Self {
    self.args.push(input.key.as_str().to_string());
    self
  }
  /// Returns all arguments: virtual machine arguments first.
  pub fn into_args(self) -> Vec<String> {
    let mut args = self.jvm_args;
    args.extend(self.args);
    args
  }
}


/// Configuration of WSDL-to-Java generation.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct WsImportConfig {
  pub source_dest_dir: Option<PathBuf>,
  pub dest_dir: Option<PathBuf>,
  pub keep: bool,
  pub extension: bool,
  pub verbose: bool,
  pub encoding: Option<String>,

  pub package_name: Option<String>,
  pub catalog: Option<PathBuf>,
  /// Proxy as `[user[:password]@]host:port`. Takes precedence over `proxy_settings`.
  pub http_proxy: Option<String>,
  pub proxy_settings: Option<ProxySettings>,

  pub wsdl_directory: PathBuf,
  /// WSDL files relative to `wsdl_directory`, or absolute. When `None`, every `*.wsdl` file in `wsdl_directory`.
  pub wsdl_files: Option<Vec<PathBuf>>,
  pub wsdl_urls: Vec<Url>,
  pub binding_directory: PathBuf,
  /// Binding files relative to `binding_directory`, or absolute. When `None`, every `*.xml` file in
  /// `binding_directory`.
  pub binding_files: Option<Vec<PathBuf>>,
  /// Value of the generated `wsdlLocation` annotations. Every `*` is replaced by the path of the WSDL relative to the
  /// directory it was found in.
  pub wsdl_location: Option<String>,

  pub target: Option<String>,
  pub quiet: bool,
  pub impl_service_name: Option<String>,
  pub impl_port_name: Option<String>,
  pub gen_jws: bool,
  pub impl_dest_dir: Option<PathBuf>,

  pub xnocompile: bool,
  pub xadditional_headers: bool,
  pub xdebug: bool,
  pub xno_addressing_databinding: bool,
  pub xauth_file: Option<PathBuf>,
  pub xdisable_ssl_hostname_verification: bool,
  pub xuse_base_resource_and_url_to_load_wsdl: bool,
  pub xdisable_authenticator: bool,
  pub xjc_args: Vec<String>,
}

impl Default for WsImportConfig {
  fn default() -> Self {
    Self {
      source_dest_dir: None,
      dest_dir: None,
      keep: true,
      extension: false,
      verbose: false,
      encoding: None,
      package_name: None,
      catalog: None,
      http_proxy: None,
      proxy_settings: None,
      wsdl_directory: PathBuf::from("src/wsdl"),
      wsdl_files: None,
      wsdl_urls: Vec::new(),
      binding_directory: PathBuf::from("src/jaxws"),
      binding_files: None,
      wsdl_location: None,
      target: None,
      quiet: false,
      impl_service_name: None,
      impl_port_name: None,
      gen_jws: false,
      impl_dest_dir: None,
      xnocompile: true,
      xadditional_headers: false,
      xdebug: false,
      xno_addressing_databinding: false,
      xauth_file: None,
      xdisable_ssl_hostname_verification: false,
      xuse_base_resource_and_url_to_load_wsdl: false,
      xdisable_authenticator: false,
      xjc_args: Vec::new(),
    }
  }
}

impl WsImportConfig {
  /// Returns a copy of this configuration with relative directories and files resolved against `base_dir`. Relative
  /// WSDL and binding files stay relative to their directory.
  pub fn resolve(&self, base_dir: impl AsRef<Path>) -> Self {
    let base_dir = base_dir.as_ref();
    let resolve = |path: &Option<PathBuf>| path.as_ref().map(|p| resolve_path(base_dir, p));
    Self {
      source_dest_dir: resolve(&self.source_dest_dir),
      dest_dir: resolve(&self.dest_dir),
      catalog: resolve(&self.catalog),
      wsdl_directory: resolve_path(base_dir, &self.wsdl_directory),
      binding_directory: resolve_path(base_dir, &self.binding_directory),
      impl_dest_dir: resolve(&self.impl_dest_dir),
      xauth_file: resolve(&self.xauth_file),
      ..self.clone()
    }
  }

  /// Returns the binding files, which every input depends on.
  pub fn binding_files(&self) -> Result<Vec<PathBuf>, ConfigurationError> {
    match &self.binding_files {
      Some(files) => Ok(files.iter().map(|f| resolve_path(&self.binding_directory, f)).collect()),
      None => list_files_with_extension(&self.binding_directory, "xml"),
    }
  }

  /// Enumerates the inputs to generate from: WSDL URLs in order, followed by local WSDL files.
  ///
  /// # Errors
  ///
  /// Returns an error if an explicitly listed WSDL file does not exist, or if a directory cannot be read.
  pub fn inputs(&self) -> Result<Vec<Input>, ConfigurationError> {
    let dependencies = self.binding_files()?;
    let mut inputs = Vec::new();
    for url in &self.wsdl_urls {
      let key = ResourceKey::from_url(url)?;
      inputs.push(self.url_input(key, url).with_dependencies(dependencies.iter().cloned()));
    }
    for (path, relative_path) in self.local_wsdl_files()? {
      let key = ResourceKey::from_path(&path)?;
      let mut input = Input::local_file(key, path).with_dependencies(dependencies.iter().cloned());
      input.relative_path = relative_path;
      inputs.push(input);
    }
    Ok(inputs)
  }

  /// Returns local WSDL files with their path relative to `wsdl_directory`, which is `None` for files listed by
  /// absolute path.
  fn local_wsdl_files(&self) -> Result<Vec<(PathBuf, Option<String>)>, ConfigurationError> {
    match &self.wsdl_files {
      Some(files) => files.iter().map(|file| {
        let path = resolve_path(&self.wsdl_directory, file);
        if !path.is_file() {
          return Err(ConfigurationError::WsdlNotFound(file.clone()));
        }
        let relative_path = (!file.is_absolute()).then(|| relative_path_string(file));
        Ok((path, relative_path))
      }).collect(),
      None => Ok(list_files_with_extension(&self.wsdl_directory, "wsdl")?
        .into_iter()
        .map(|path| {
          let relative_path = path.file_name().map(|n| n.to_string_lossy().into_owned());
          (path, relative_path)
        })
        .collect()),
    }
  }

  #[cfg(feature = "remote")]
  fn url_input(&self, key: ResourceKey, url: &Url) -> Input {
    use std::time::Duration;

    use crate::error::InspectionError;
    use crate::source::FnSource;
    use crate::source::remote::Remote;

    if url.scheme() == "file" {
      if let Some(path) = key.as_path() {
        let path = path.to_path_buf();
        return Input::local_file(key, path);
      }
    }
    match Remote::with_proxy(url.clone(), self.proxy_settings.as_ref(), Duration::from_secs(30)) {
      Ok(remote) => Input::new(key, remote),
      Err(e) => {
        let message = e.to_string();
        Input::new(key, FnSource(move || Err(InspectionError::Remote(message.clone().into()))))
      }
    }
  }
  #[cfg(not(feature = "remote"))]
  fn url_input(&self, key: ResourceKey, url: &Url) -> Input {
    use crate::source::Known;

    if url.scheme() == "file" {
      if let Some(path) = key.as_path() {
        let path = path.to_path_buf();
        return Input::local_file(key, path);
      }
    }
    Input::new(key, Known(None))
  }

  /// Builds the generator arguments for an input with `relative_path`, excluding the input location itself.
  ///
  /// # Errors
  ///
  /// Returns an error if binding files are combined with a `wsdl_location` containing `*`, since one binding file
  /// cannot be bound to several WSDL files.
  pub fn args(&self, relative_path: Option<&str>) -> Result<Invocation, ConfigurationError> {
    let mut invocation = Invocation::default();
    let args = &mut invocation.args;
    self.common_args(args);

    if let Some(http_proxy) = &self.http_proxy {
      args.push(format!("-httpproxy:{}", http_proxy));
    } else if let Some(settings) = &self.proxy_settings {
      if let Some(proxy) = settings.active_http_proxy_string() {
        args.push(format!("-httpproxy:{}", proxy));
      }
      if let Some(hosts) = settings.active_non_proxy_hosts() {
        invocation.jvm_args.push(format!("-Dhttp.nonProxyHosts={}", hosts));
      }
    }

    if let Some(package_name) = &self.package_name {
      push_pair(args, "-p", package_name);
    }
    if let Some(catalog) = &self.catalog {
      push_pair(args, "-catalog", catalog.display());
    }
    if let Some(location) = &self.wsdl_location {
      match relative_path {
        Some(relative_path) => push_pair(args, "-wsdllocation", location.replace('*', relative_path)),
        None if !location.contains('*') => push_pair(args, "-wsdllocation", location),
        None => {}
      }
    }
    if let Some(target) = &self.target {
      push_pair(args, "-target", target);
    }
    push_flag(args, "-quiet", self.quiet);

    if self.gen_jws || self.impl_service_name.is_some() || self.impl_port_name.is_some() {
      args.push("-generateJWS".to_string());
      if let Some(name) = &self.impl_service_name {
        push_pair(args, "-implServiceName", name);
      }
      if let Some(name) = &self.impl_port_name {
        push_pair(args, "-implPortName", name);
      }
      push_pair(args, "-implDestDir", self.impl_dest_dir().display());
    }

    push_flag(args, "-Xdebug", self.xdebug);
    push_flag(args, "-Xno-addressing-databinding", self.xno_addressing_databinding);
    push_flag(args, "-XadditionalHeaders", self.xadditional_headers);
    if let Some(auth_file) = &self.xauth_file {
      push_pair(args, "-Xauthfile", auth_file.display());
    }
    push_flag(args, "-XdisableSSLHostnameVerification", self.xdisable_ssl_hostname_verification);
    push_flag(args, "-XuseBaseResourceAndURLToLoadWSDL", self.xuse_base_resource_and_url_to_load_wsdl);
    push_flag(args, "-XdisableAuthenticator", self.xdisable_authenticator);
    for xjc_arg in &self.xjc_args {
      if xjc_arg.starts_with('-') {
        args.push(format!("-B{}", xjc_arg));
      } else {
        args.push(xjc_arg.clone());
      }
    }

    let bindings = self.binding_files()?;
    if let Some(location) = self.wsdl_location.as_ref().filter(|l| l.contains('*')) {
      if !bindings.is_empty() {
        return Err(ConfigurationError::BindingsWithWildcardLocation(location.clone()));
      }
    }
    for binding in bindings {
      let binding = Url::from_file_path(&binding).map(String::from).unwrap_or_else(|_| binding.display().to_string());
      push_pair(args, "-b", binding);
    }

    Ok(invocation)
  }

  /// Builds the complete generator arguments for `input`.
  pub fn args_for(&self, input: &Input) -> Result<Vec<String>, ConfigurationError> {
    Ok(self.args(input.relative_path.as_deref())?.with_input(input).into_args())
  }

  fn common_args(&self, args: &mut Vec<String>) {
    common_args(args, CommonArgs {
      keep: self.keep,
      source_dest_dir: self.source_dest_dir.as_deref(),
      dest_dir: self.dest_dir.as_deref(),
      encoding: self.encoding.as_deref(),
      extension: self.extension,
      verbose: self.verbose,
      xnocompile: self.xnocompile,
    });
  }

  fn impl_dest_dir(&self) -> PathBuf {
    self.impl_dest_dir.clone()
      .or_else(|| self.source_dest_dir.clone())
      .unwrap_or_else(|| PathBuf::from("src/main/java"))
  }
}


/// Arguments shared by both generators.
pub(crate) struct CommonArgs<'a> {
  pub keep: bool,
  pub source_dest_dir: Option<&'a Path>,
  pub dest_dir: Option<&'a Path>,
  pub encoding: Option<&'a str>,
  pub extension: bool,
  pub verbose: bool,
  pub xnocompile: bool,
}

pub(crate) fn common_args(args: &mut Vec<String>, common: CommonArgs) {
  push_flag(args, "-keep", common.keep);
  if let Some(dir) = common.source_dest_dir {
    push_pair(args, "-s", dir.display());
  }
  if let Some(dir) = common.dest_dir {
    push_pair(args, "-d", dir.display());
  }
  if let Some(encoding) = common.encoding {
    push_pair(args, "-encoding", encoding);
  }
  push_flag(args, "-extension", common.extension);
  push_flag(args, "-verbose", common.verbose);
  push_flag(args, "-Xnocompile", common.xnocompile);
}

#[inline]
pub(crate) fn push_flag(args: &mut Vec<String>, flag: &str, enabled: bool) {
  if enabled {
    args.push(flag.to_string());
  }
}
#[inline]
pub(crate) fn push_pair(args: &mut Vec<String>, flag: &str, value: impl ToString) {
  args.push(flag.to_string());
  args.push(value.to_string());
}

fn relative_path_string(path: &Path) -> String {
  path.components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}

/// Lists files directly in `dir` with `extension`, sorted. A missing directory has no files.
fn list_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ConfigurationError> {
  let entries = match read_dir(dir) {
    Ok(entries) => entries,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
    Err(e) => return Err(ConfigurationError::ReadDirectory(dir.to_path_buf(), e)),
  };
  let mut files = Vec::new();
  for entry in entries {
    let path = entry.map_err(|e| ConfigurationError::ReadDirectory(dir.to_path_buf(), e))?.path();
    if path.is_file() && path.extension() == Some(OsStr::new(extension)) {
      files.push(path);
    }
  }
  files.sort();
  Ok(files)
}
