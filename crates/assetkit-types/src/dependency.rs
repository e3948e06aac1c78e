//! Dependency records: the entries of a container's dependency list.
//!
//! Order in the list is significant. Object references embedded in a
//! container's data carry a file index `n`; index 0 is the container itself
//! and `n >= 1` resolves to the record at position `n - 1`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A 128-bit globally unique identifier stored as two 64-bit halves.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct Guid128 {
    pub most_significant: u64,
    pub least_significant: u64,
}

impl Guid128 {
    pub fn new(most_significant: u64, least_significant: u64) -> Self {
        Self {
            most_significant,
            least_significant,
        }
    }

    /// Returns `true` if both halves are zero.
    pub fn is_zero(&self) -> bool {
        self.most_significant == 0 && self.least_significant == 0
    }

    /// Parse from 32 hex digits, most significant half first.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 16 {
            return Err(TypeError::InvalidLength {
                expected: 16,
                actual: bytes.len(),
            });
        }
        let mut hi = [0u8; 8];
        let mut lo = [0u8; 8];
        hi.copy_from_slice(&bytes[..8]);
        lo.copy_from_slice(&bytes[8..]);
        Ok(Self::new(u64::from_be_bytes(hi), u64::from_be_bytes(lo)))
    }

    /// Hex-encoded string representation (32 lowercase digits).
    pub fn to_hex(&self) -> String {
        format!("{:016x}{:016x}", self.most_significant, self.least_significant)
    }
}

impl fmt::Display for Guid128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Guid128 {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<Guid128> for String {
    fn from(guid: Guid128) -> Self {
        guid.to_hex()
    }
}

impl TryFrom<String> for Guid128 {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

/// One entry of a container's dependency list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyRecord {
    /// Another container named by path.
    Path(String),
    /// Another container named by its unique identifier.
    Guid(Guid128),
}

impl DependencyRecord {
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    pub fn guid(guid: Guid128) -> Self {
        Self::Guid(guid)
    }

    /// The path of this record, if it names one.
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Self::Path(path) => Some(path),
            Self::Guid(_) => None,
        }
    }

    /// The final component of the path, if this record names a path.
    ///
    /// Both `/` and `\` separate components, since records written on any
    /// platform may appear in a container.
    pub fn file_name(&self) -> Option<&str> {
        self.as_path()
            .map(|path| path.rsplit(['/', '\\']).next().unwrap_or(path))
    }
}

impl fmt::Display for DependencyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.write_str(path),
            Self::Guid(guid) => write!(f, "{guid}"),
        }
    }
}
