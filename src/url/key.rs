use crate::UrlError;
use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

/// Stable fixed-width key derived from a canonical URL
///
/// The key is the SHA-256 digest of the canonical URL string. It is the
/// identity of a frontier entry: two URLs with the same canonical form
/// always produce the same key, and a hash collision is treated as the
/// same URL (accepted approximation).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct UrlKey([u8; 32]);

impl UrlKey {
    /// Derives the key for a canonical URL
    ///
    /// The input must already be canonical; callers should obtain keys
    /// through [`crate::url::canonicalize`] rather than calling this on
    /// raw input.
    pub fn from_canonical(url: &Url) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        Self(hasher.finalize().into())
    }

    /// Hex encoding used as the primary key in the frontier database
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a key from its hex encoding
    ///
    /// Used when loading persisted frontier rows; a malformed value means
    /// the stored state is corrupt, which the storage layer reports as a
    /// distinct error rather than panicking.
    pub fn from_hex(s: &str) -> Result<Self, UrlError> {
        let bytes = hex::decode(s)
            .map_err(|e| UrlError::Malformed(format!("Invalid key encoding: {}", e)))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| UrlError::Malformed(format!("Key must be 32 bytes, got '{}'", s)))?;
        Ok(Self(array))
    }
}

impl fmt::Debug for UrlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UrlKey({})", self.to_hex())
    }
}

impl fmt::Display for UrlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
