use std::fmt::{Display, Formatter};

use crate::key::ResourceKey;

/// Short identifier of a [`ResourceKey`], used as the file name of its marker.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Fingerprint {
  hex: String,
  degraded: bool,
}

impl Fingerprint {
  /// Returns the fingerprint as a string that is safe to use as a file name.
  #[inline]
  pub fn as_str(&self) -> &str { &self.hex }
  /// Returns `true` if this fingerprint was derived without a digest, and therefore collides for keys that share their
  /// last path segment.
  #[inline]
  pub fn is_degraded(&self) -> bool { self.degraded }
}

impl Display for Fingerprint {
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { self.hex.fmt(f) }
}


/// Derives [fingerprints](Fingerprint) from [resource keys](ResourceKey). Implementations must be deterministic and
/// free of side effects.
pub trait Fingerprinter {
  fn fingerprint(&self, key: &ResourceKey) -> Fingerprint;
}

impl<F: Fingerprinter + ?Sized> Fingerprinter for &F {
  #[inline]
  fn fingerprint(&self, key: &ResourceKey) -> Fingerprint { (**self).fingerprint(key) }
}


/// [`Fingerprinter`] that hex-encodes the SHA-256 digest of the key, producing 64 characters.
#[cfg(feature = "sha256")]
#[derive(Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Sha256Fingerprinter;

#[cfg(feature = "sha256")]
impl Fingerprinter for Sha256Fingerprinter {
  fn fingerprint(&self, key: &ResourceKey) -> Fingerprint {
    use std::fmt::Write;

    use sha2::{Digest, Sha256};

    let digest = Sha256::digest(key.as_str().as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
      write!(hex, "{:02x}", byte).ok();
    }
    Fingerprint { hex, degraded: false }
  }
}


/// Degraded [`Fingerprinter`] for when no digest is available: the last path segment of the key with `.` replaced by
/// `-`. Keys with the same last segment collide, so every fingerprint it produces is flagged as
/// [degraded](Fingerprint::is_degraded).
#[derive(Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct SegmentFingerprinter;

const SEPARATORS: &[char] = &['/', '\\'];

impl Fingerprinter for SegmentFingerprinter {
  fn fingerprint(&self, key: &ResourceKey) -> Fingerprint {
    let key = key.as_str().trim_end_matches(SEPARATORS);
    let segment = match key.rfind(SEPARATORS) {
      Some(index) => &key[index + 1..],
      None => key,
    };
    let hex: String = segment.chars()
      .map(|c| match c {
        '.' => '-',
        c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => c,
        _ => '_',
      })
      .collect();
    let hex = if hex.is_empty() { "_".to_string() } else { hex };
    Fingerprint { hex, degraded: true }
  }
}


/// The [`Fingerprinter`] used by default: [`Sha256Fingerprinter`] when the `sha256` feature is enabled, the degraded
/// [`SegmentFingerprinter`] otherwise.
#[derive(Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct DefaultFingerprinter;

#[cfg(feature = "sha256")]
impl Fingerprinter for DefaultFingerprinter {
  #[inline]
  fn fingerprint(&self, key: &ResourceKey) -> Fingerprint { Sha256Fingerprinter.fingerprint(key) }
}

#[cfg(not(feature = "sha256"))]
impl Fingerprinter for DefaultFingerprinter {
  #[inline]
  fn fingerprint(&self, key: &ResourceKey) -> Fingerprint { SegmentFingerprinter.fingerprint(key) }
}
