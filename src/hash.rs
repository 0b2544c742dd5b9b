use std::fmt;

use sha1::{Digest, Sha1};

use crate::error::Error;

/// a SHA-1 object identifier, stored in its 20-byte binary form
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; 20]);

impl Hash {
    /// parse from a 40-char lowercase hex string
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        if s.len() != 40 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidHashHex(s.to_string()));
        }
        let bytes = hex::decode(s).map_err(|_| Error::InvalidHashHex(s.to_string()))?;
        Self::from_bytes_slice(&bytes)
    }

    /// create from an owned 20-byte array
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// create from a byte slice, validating its length is exactly 20
    pub fn from_bytes_slice(bytes: &[u8]) -> crate::Result<Self> {
        if bytes.len() != 20 {
            return Err(Error::InvalidHashHex(hex::encode(bytes)));
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// raw 20-byte binary form
    pub fn to_bytes(&self) -> [u8; 20] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// 40-char lowercase hex form
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// first 2 hex chars: the object directory name
    pub fn dir_name(&self) -> String {
        self.to_hex()[..2].to_string()
    }

    /// remaining 38 hex chars: the object file name within its directory
    pub fn file_name(&self) -> String {
        self.to_hex()[2..].to_string()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

/// compute the SHA-1 digest of a byte sequence
///
/// a fresh hasher per call; no shared state.
pub fn sha1(bytes: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hasher.finalize().into()
}
