//! Compact MD5 digest type
//!
//! Cache keys and download checksums are both MD5 digests. This module stores
//! them as 16-byte arrays and renders them as lowercase hex on demand.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CacheError, CacheResult};

/// MD5 digest stored as its raw 16-byte representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Md5Hash([u8; 16]);

impl Md5Hash {
    /// Digest a byte slice in one go
    ///
    /// # Examples
    ///
    /// ```rust
    /// use image_cache::app::Md5Hash;
    ///
    /// let hash = Md5Hash::compute("hello world");
    /// assert_eq!(hash.to_hex(), "5eb63bbbe01eeed093cb22bb8f5acdc3");
    /// ```
    pub fn compute(data: impl AsRef<[u8]>) -> Self {
        Md5Hash(md5::compute(data).0)
    }

    /// Create an MD5 hash from a hex string
    ///
    /// # Arguments
    ///
    /// * `hex` - 32-character hexadecimal string (case insensitive)
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidHash` if the string is not a valid MD5 hex
    /// representation
    pub fn from_hex(hex: &str) -> CacheResult<Self> {
        if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CacheError::InvalidHash {
                hash: hex.to_string(),
            });
        }

        let mut bytes = [0u8; 16];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| CacheError::InvalidHash {
                hash: hex.to_string(),
            })?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| CacheError::InvalidHash {
                hash: hex.to_string(),
            })?;
        }

        Ok(Md5Hash(bytes))
    }

    /// Lowercase 32-character hex representation
    pub fn to_hex(&self) -> String {
        use std::fmt::Write;
        self.0.iter().fold(String::with_capacity(32), |mut acc, b| {
            let _ = write!(&mut acc, "{:02x}", b);
            acc
        })
    }

    /// Get the raw byte array representation
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Md5Hash(bytes)
    }
}

impl From<md5::Digest> for Md5Hash {
    fn from(digest: md5::Digest) -> Self {
        Md5Hash(digest.0)
    }
}

impl fmt::Display for Md5Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Md5Hash {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Serialized as a hex string so JSON output stays readable
impl Serialize for Md5Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Md5Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_string = String::deserialize(deserializer)?;
        Self::from_hex(&hex_string).map_err(serde::de::Error::custom)
    }
}
