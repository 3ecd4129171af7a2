use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 digest of a fetched payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash([u8; 32]);

impl Hash {
    /// Calculate hash value from the given bytes.
    ///
    /// To parse the hex representation produced by `Display`, use `from_hash_str`.
    pub fn new<Bytes: AsRef<[u8]>>(v: Bytes) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(v.as_ref());
        Hash(hasher.finalize().into())
    }

    /// Digest of the compact JSON rendering of `payload`.
    pub fn of_payload(payload: &serde_json::Value) -> Self {
        Self::new(payload.to_string())
    }

    pub fn from_hash_str(s: &str) -> Result<Self, FromHashStrError> {
        // `from_str_radix` alone would accept a leading `+`.
        if s.len() != 64 || !s.bytes().all(|x| x.is_ascii_hexdigit()) {
            return Err(FromHashStrError);
        }

        let mut buf = [0u8; 32];
        for (i, pair) in s.as_bytes().chunks_exact(2).enumerate() {
            let pair = std::str::from_utf8(pair).map_err(|_| FromHashStrError)?;
            buf[i] = u8::from_str_radix(pair, 16).map_err(|_| FromHashStrError)?;
        }

        Ok(Hash(buf))
    }

    /// First eight hex digits, for log lines.
    pub fn short(&self) -> String {
        self.0[..4].iter().map(|x| format!("{x:02x}")).collect()
    }
}

impl Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for x in self.0.iter() {
            f.write_fmt(format_args!("{x:02x}"))?;
        }

        Ok(())
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Hash::from_hash_str(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FromHashStrError;
impl Display for FromHashStrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Hash string must be hex digits of length 64")
    }
}

impl std::error::Error for FromHashStrError {}
