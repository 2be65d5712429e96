//! # Size Spec Module
//!
//! Parsing delle dimensioni human-readable usate da `--minimum-size`.
//!
//! ## Grammatica:
//! - una o più cifre decimali
//! - spazi opzionali
//! - unità opzionale `k`, `m` o `g` (case-insensitive)
//! - la lettera finale `b` (case-insensitive, obbligatoria)
//!
//! I multipli sono binari: `k` = 1024, `m` = 1024², `g` = 1024³.
//!
//! ## Esempio:
//! ```rust
//! use compress_clips::ByteSize;
//!
//! let size: ByteSize = "10MB".parse().unwrap();
//! assert_eq!(size.bytes(), 10 * 1024 * 1024);
//! assert!("10".parse::<ByteSize>().is_err());
//! ```

use crate::error::CompressError;
use regex_lite::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

const KIB: u64 = 1024;

fn size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^([0-9]+)[ \t]*([kmg])?b$").expect("size pattern is a valid regex")
    })
}

/// A byte count, usually parsed from a size spec such as `"10MB"` or `"5 KB"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteSize(u64);

impl ByteSize {
    pub const fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    pub const fn bytes(self) -> u64 {
        self.0
    }

    /// Parse a size spec into a byte count.
    pub fn parse(input: &str) -> Result<Self, CompressError> {
        let invalid = || CompressError::SizeSpec {
            input: input.to_string(),
        };

        let captures = size_pattern().captures(input).ok_or_else(invalid)?;
        let amount: u64 = captures[1].parse().map_err(|_| invalid())?;

        let multiplier = match captures.get(2).map(|unit| unit.as_str().to_ascii_lowercase()) {
            None => 1,
            Some(unit) => match unit.as_str() {
                "k" => KIB,
                "m" => KIB * KIB,
                _ => KIB * KIB * KIB,
            },
        };

        amount.checked_mul(multiplier).map(Self).ok_or_else(invalid)
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl FromStr for ByteSize {
    type Err = CompressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}B", self.0)
    }
}

impl Serialize for ByteSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

// A plain number is taken as an already-parsed byte count.
impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bytes(u64),
            Spec(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bytes(bytes) => Ok(Self(bytes)),
            Raw::Spec(spec) => Self::parse(&spec).map_err(serde::de::Error::custom),
        }
    }
}
