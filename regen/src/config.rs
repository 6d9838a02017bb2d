use std::path::{Path, PathBuf};

use crate::error::ConfigurationError;
use crate::store::StalenessStore;

/// Configuration of the staleness cache.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct CacheConfig {
  /// Directory containing the markers. Relative paths are resolved against the project base directory.
  pub store_dir: PathBuf,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { store_dir: PathBuf::from("target/jaxws/stale") }
  }
}

impl CacheConfig {
  /// Returns a copy of this configuration with relative paths resolved against `base_dir`.
  pub fn resolve(&self, base_dir: impl AsRef<Path>) -> Self {
    Self { store_dir: resolve_path(base_dir, &self.store_dir) }
  }
  /// Opens the [store](StalenessStore), creating its directory.
  #[inline]
  pub fn open_store(&self) -> Result<StalenessStore, ConfigurationError> {
    StalenessStore::open(&self.store_dir)
  }
}


/// Proxy declarations, as found in user-level build tool settings.
#[derive(Default, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ProxySettings {
  pub proxies: Vec<Proxy>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Proxy {
  pub active: bool,
  pub protocol: String,
  pub host: String,
  pub port: u16,
  pub username: Option<String>,
  pub password: Option<String>,
  /// Hosts that bypass the proxy, separated by `|`.
  pub non_proxy_hosts: Option<String>,
}

impl Default for Proxy {
  fn default() -> Self {
    Self {
      active: true,
      protocol: "http".to_string(),
      host: String::new(),
      port: 8080,
      username: None,
      password: None,
      non_proxy_hosts: None,
    }
  }
}

impl Proxy {
  /// Formats this proxy as `[user[:password]@]host:port`.
  pub fn to_proxy_string(&self) -> String {
    let mut string = String::new();
    if let Some(username) = &self.username {
      string.push_str(username);
      if let Some(password) = &self.password {
        string.push(':');
        string.push_str(password);
      }
      string.push('@');
    }
    string.push_str(&self.host);
    string.push(':');
    string.push_str(&self.port.to_string());
    string.trim().to_string()
  }
}

impl ProxySettings {
  /// Returns the first active proxy for the `http` protocol.
  pub fn active_http_proxy(&self) -> Option<&Proxy> {
    self.proxies.iter().find(|p| p.active && p.protocol == "http")
  }
  /// Returns the first active `http` proxy formatted as `[user[:password]@]host:port`.
  #[inline]
  pub fn active_http_proxy_string(&self) -> Option<String> {
    self.active_http_proxy().map(Proxy::to_proxy_string)
  }
  /// Returns the non-proxy hosts of the first active `http` proxy.
  #[inline]
  pub fn active_non_proxy_hosts(&self) -> Option<&str> {
    self.active_http_proxy().and_then(|p| p.non_proxy_hosts.as_deref())
  }
}


/// Returns `path` if it is absolute, or `path` joined onto `base_dir` otherwise.
pub(crate) fn resolve_path(base_dir: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
  let path = path.as_ref();
  if path.is_absolute() { path.to_path_buf() } else { base_dir.as_ref().join(path) }
}
