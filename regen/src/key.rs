use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::error::ConfigurationError;

/// Canonical, non-empty identifier of a build input: an absolute, lexically normalized file path, or a serialized URL.
///
/// Keys are compared as strings, so two keys are equal iff they denote the same input, across process runs. `file:`
/// URLs are converted into paths, so that a WSDL file referred to by URL and by path share a key.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct ResourceKey(String);

impl ResourceKey {
  /// Creates a key from an absolute path or a path relative to `base`.
  pub fn from_path_in(path: impl AsRef<Path>, base: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
    let path = path.as_ref();
    let absolute = if path.is_absolute() { path.to_path_buf() } else { base.as_ref().join(path) };
    Self::from_absolute(absolute)
  }
  /// Creates a key from an absolute path or a path relative to the current working directory.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
    let path = path.as_ref();
    let absolute = std::path::absolute(path)
      .map_err(|_| ConfigurationError::InvalidResourceKey(path.display().to_string()))?;
    Self::from_absolute(absolute)
  }
  /// Creates a key from `url`, converting `file:` URLs into paths.
  pub fn from_url(url: &Url) -> Result<Self, ConfigurationError> {
    if url.scheme() == "file" {
      let path = url.to_file_path()
        .map_err(|_| ConfigurationError::InvalidResourceKey(url.to_string()))?;
      Self::from_absolute(path)
    } else {
      Ok(Self(url.as_str().to_string()))
    }
  }
  /// Parses `string` as a URL if it has a scheme of at least two characters, or as a path otherwise, so that Windows
  /// drive letters are not mistaken for URL schemes.
  pub fn parse(string: &str) -> Result<Self, ConfigurationError> {
    if string.trim().is_empty() {
      return Err(ConfigurationError::InvalidResourceKey(string.to_string()));
    }
    match Url::parse(string) {
      Ok(url) if url.scheme().len() > 1 => Self::from_url(&url),
      _ => Self::from_path(string),
    }
  }

  fn from_absolute(path: PathBuf) -> Result<Self, ConfigurationError> {
    let normalized = normalize(&path);
    match normalized.to_str() {
      Some(s) if !s.is_empty() => Ok(Self(s.to_string())),
      _ => Err(ConfigurationError::InvalidResourceKey(path.display().to_string())),
    }
  }

  #[inline]
  pub fn as_str(&self) -> &str { &self.0 }

  /// Returns `Some(url)` if this key denotes a non-file URL, `None` if it denotes a local path.
  pub fn as_url(&self) -> Option<Url> {
    if Path::new(&self.0).is_absolute() {
      return None;
    }
    Url::parse(&self.0).ok()
  }
  /// Returns `Some(path)` if this key denotes a local path, `None` if it denotes a URL.
  pub fn as_path(&self) -> Option<&Path> {
    let path = Path::new(&self.0);
    path.is_absolute().then_some(path)
  }
}

/// Lexically normalizes `path`: removes `.` components, pops a normal component for every `..`, and drops `..` at the
/// root. Does not touch the filesystem, so symbolic links are not resolved.
fn normalize(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => match normalized.components().next_back() {
        Some(Component::Normal(_)) => { normalized.pop(); }
        // `..` of the root is the root itself.
        Some(Component::RootDir | Component::Prefix(_)) => {}
        _ => normalized.push(component),
      },
      c => normalized.push(c),
    }
  }
  normalized
}

impl Display for ResourceKey {
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { self.0.fmt(f) }
}

impl AsRef<str> for ResourceKey {
  #[inline]
  fn as_ref(&self) -> &str { &self.0 }
}

impl TryFrom<String> for ResourceKey {
  type Error = ConfigurationError;
  #[inline]
  fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(&value) }
}

impl From<ResourceKey> for String {
  #[inline]
  fn from(value: ResourceKey) -> Self { value.0 }
}
