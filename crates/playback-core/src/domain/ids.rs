//! LEGO/seed identifiers.
//!
//! Formats (spec §6): `S{seedNumber:04}L{legoIndex:02}` and `S{seedNumber:04}`.
//! These are relied on by round sort order and by the loader's seed-from-id
//! extraction, so parsing/formatting lives in one place.

use std::fmt;
use std::str::FromStr;

use super::errors::IdParseError;

/// A seed identifier: a numbered slot in the course syllabus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct SeedId(pub u32);

impl SeedId {
    pub fn new(seed_number: u32) -> Self {
        Self(seed_number)
    }

    pub fn number(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:04}", self.0)
    }
}

impl FromStr for SeedId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('S')
            .ok_or_else(|| IdParseError::InvalidFormat(s.to_string()))?;
        let n = digits
            .parse::<u32>()
            .map_err(|_| IdParseError::Malformed(s.to_string()))?;
        Ok(Self(n))
    }
}

/// A LEGO identifier: one atomic learning unit within a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct LegoId {
    pub seed: u32,
    pub index: u32,
}

impl LegoId {
    pub fn new(seed: u32, index: u32) -> Self {
        Self { seed, index }
    }

    pub fn seed_id(self) -> SeedId {
        SeedId(self.seed)
    }
}

impl fmt::Display for LegoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:04}L{:02}", self.seed, self.index)
    }
}

impl FromStr for LegoId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('S')
            .ok_or_else(|| IdParseError::InvalidFormat(s.to_string()))?;
        let (seed_str, index_str) = digits
            .split_once('L')
            .ok_or_else(|| IdParseError::InvalidFormat(s.to_string()))?;
        let seed = seed_str
            .parse::<u32>()
            .map_err(|_| IdParseError::Malformed(s.to_string()))?;
        let index = index_str
            .parse::<u32>()
            .map_err(|_| IdParseError::Malformed(s.to_string()))?;
        Ok(Self { seed, index })
    }
}
