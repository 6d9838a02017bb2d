use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Invalid or missing configuration. Fatal for the input being processed, but not necessarily for the whole batch.
#[derive(Debug)]
pub enum ConfigurationError {
  /// The store directory could not be created, or something other than a directory exists at its path.
  StoreDirectory(PathBuf, io::Error),
  /// A resource key could not be derived, for example from an empty string.
  InvalidResourceKey(String),
  /// An explicitly listed WSDL file does not exist.
  WsdlNotFound(PathBuf),
  /// A directory to enumerate input files from could not be read.
  ReadDirectory(PathBuf, io::Error),
  /// External binding files cannot be bound to multiple WSDL files through an asterisk WSDL location.
  BindingsWithWildcardLocation(String),
}

impl Error for ConfigurationError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      Self::StoreDirectory(_, e) | Self::ReadDirectory(_, e) => Some(e),
      _ => None,
    }
  }
}

impl Display for ConfigurationError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::StoreDirectory(path, e) => write!(f, "cannot use store directory '{}': {}", path.display(), e),
      Self::InvalidResourceKey(key) => write!(f, "invalid resource key '{}'", key),
      Self::WsdlNotFound(path) => write!(f, "'{}' not found", path.display()),
      Self::ReadDirectory(path, e) => write!(f, "cannot read directory '{}': {}", path.display(), e),
      Self::BindingsWithWildcardLocation(location) => write!(
        f,
        "external binding file(s) can not be bound to more WSDL files ({}); use either inline binding(s) or separate \
        configurations",
        location
      ),
    }
  }
}


/// Failure to determine the last modified instant of a resource. Recovered by treating the resource as unchanged.
#[derive(Debug)]
pub enum InspectionError {
  Io(io::Error),
  /// A remote resource could not be queried.
  Remote(Box<dyn Error + Send + Sync>),
  /// A remote resource reported a last modified value that could not be parsed.
  InvalidTimestamp(String),
}

impl Error for InspectionError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      Self::Io(e) => Some(e),
      Self::Remote(e) => Some(e.as_ref()),
      Self::InvalidTimestamp(_) => None,
    }
  }
}

impl Display for InspectionError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io(e) => write!(f, "cannot inspect resource: {}", e),
      Self::Remote(e) => write!(f, "cannot inspect remote resource: {}", e),
      Self::InvalidTimestamp(value) => write!(f, "invalid last modified value '{}'", value),
    }
  }
}

impl From<io::Error> for InspectionError {
  #[inline]
  fn from(value: io::Error) -> Self { Self::Io(value) }
}


/// Failure to create or update a marker after a successful generation. Recovered: only the next run's ability to skip
/// generation is impaired.
#[derive(Debug)]
pub struct CacheWriteError {
  pub marker: PathBuf,
  pub error: io::Error,
}

impl Error for CacheWriteError {
  fn source(&self) -> Option<&(dyn Error + 'static)> { Some(&self.error) }
}

impl Display for CacheWriteError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "cannot update marker '{}': {}", self.marker.display(), self.error)
  }
}


/// The external generator failed. Terminal for the input being processed.
#[derive(Debug)]
pub enum GenerationError {
  /// The generator process could not be started.
  Spawn { program: String, error: io::Error },
  /// The generator ran but exited unsuccessfully.
  Failed { status: ExitStatus, stderr: String },
  /// The generator reported failure in some other way.
  Other(String),
}

impl Error for GenerationError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      Self::Spawn { error, .. } => Some(error),
      _ => None,
    }
  }
}

impl Display for GenerationError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Spawn { program, error } => write!(f, "cannot start '{}': {}", program, error),
      Self::Failed { status, stderr } if stderr.trim().is_empty() => write!(f, "generator {}", status),
      Self::Failed { status, stderr } => write!(f, "generator {}: {}", status, stderr.trim()),
      Self::Other(message) => message.fmt(f),
    }
  }
}


#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_display() {
    let error = ConfigurationError::WsdlNotFound(PathBuf::from("a.wsdl"));
    assert_eq!(error.to_string(), "'a.wsdl' not found");

    let error = InspectionError::from(io::Error::new(io::ErrorKind::TimedOut, "timed out"));
    assert_eq!(error.to_string(), "cannot inspect resource: timed out");
    assert!(error.source().is_some());

    let error = GenerationError::Other("boom".to_string());
    assert_eq!(error.to_string(), "boom");
  }
}
