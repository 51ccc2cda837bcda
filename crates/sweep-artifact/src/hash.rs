//! Provenance hashing
//!
//! [`ContentHash`] identifies an artifact or a job by the Blake3 digest of the
//! fields that determine it. [`ProvenanceHasher`] feeds those fields in a
//! framed encoding so that `("ab", "c")` and `("a", "bc")` never collide.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte Blake3 digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Digest of raw bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Digest of the JSON encoding of `value`
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn of_json<T>(value: &T) -> Result<Self, HashError>
    where
        T: serde::Serialize + ?Sized,
    {
        let json = serde_json::to_vec(value)?;
        Ok(Self::compute(&json))
    }

    /// First 16 hex chars, used in file names and log lines
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ContentHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| HashError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl serde::Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ContentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Incremental hasher over length-framed fields
#[derive(Debug, Default)]
pub struct ProvenanceHasher {
    inner: blake3::Hasher,
}

impl ProvenanceHasher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one string field
    pub fn field(&mut self, value: &str) -> &mut Self {
        self.inner.update(&(value.len() as u64).to_le_bytes());
        self.inner.update(value.as_bytes());
        self
    }

    /// Feed a previously computed hash
    pub fn hash(&mut self, value: &ContentHash) -> &mut Self {
        self.inner.update(value.as_bytes());
        self
    }

    #[must_use]
    pub fn finish(&self) -> ContentHash {
        ContentHash(*self.inner.finalize().as_bytes())
    }
}

/// Errors raised when parsing or computing hashes
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("invalid hash length: expected 32 bytes, got {0}")]
    InvalidLength(usize),

    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse() {
        let hash = ContentHash::compute(b"gem5");
        let parsed: ContentHash = hash.to_string().parse().unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn parse_rejects_short_input() {
        let result = "abcd".parse::<ContentHash>();
        assert!(matches!(result, Err(HashError::InvalidLength(2))));
    }

    #[test]
    fn short_is_prefix() {
        let hash = ContentHash::compute(b"gem5");
        assert_eq!(hash.short().len(), 16);
        assert!(hash.to_string().starts_with(&hash.short()));
    }

    #[test]
    fn framing_separates_fields() {
        let a = ProvenanceHasher::new().field("ab").field("c").finish();
        let b = ProvenanceHasher::new().field("a").field("bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn serde_uses_hex_string() {
        let hash = ContentHash::compute(b"disk");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{hash}\""));
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
