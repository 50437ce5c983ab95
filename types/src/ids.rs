use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("juror id must be a positive integer")]
pub struct InvalidJurorId;

/// Stable juror identity. Always positive; 1-based like the seat numbers on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct JurorId(u32);

impl JurorId {
    pub fn new(id: u32) -> Result<Self, InvalidJurorId> {
        if id == 0 {
            Err(InvalidJurorId)
        } else {
            Ok(Self(id))
        }
    }

    /// Construct from a 0-based ordinal (`0 -> #1`).
    #[must_use]
    pub const fn from_ordinal(ordinal: u32) -> Self {
        Self(ordinal + 1)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// 0-based position in raster order.
    #[must_use]
    pub const fn ordinal(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Zero-padded badge used on seat cards, e.g. `#005`.
    #[must_use]
    pub fn badge(self) -> String {
        format!("#{:03}", self.0)
    }
}

impl TryFrom<u32> for JurorId {
    type Error = InvalidJurorId;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JurorId> for u32 {
    fn from(value: JurorId) -> Self {
        value.0
    }
}

impl fmt::Display for JurorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
