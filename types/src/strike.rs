//! Challenge types: which party struck a juror, and how.
//!
//! A juror's strike is a sum type. The persisted `{type, party}` pair keeps the
//! shape the workspace has always stored, and is validated at the
//! deserialization boundary so that `type = none` with a party (or a strike
//! without one) can never be loaded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Plaintiff,
    Defense,
}

impl Party {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Party::Plaintiff => "plaintiff",
            Party::Defense => "defense",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Party::Plaintiff => "Plaintiff",
            Party::Defense => "Defense",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "plaintiff" | "p" | "prosecution" => Some(Party::Plaintiff),
            "defense" | "defence" | "d" => Some(Party::Defense),
            _ => None,
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Party] {
        &[Party::Plaintiff, Party::Defense]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikeKind {
    /// Bounded by the party's peremptory allowance.
    Peremptory,
    /// Unbounded.
    ForCause,
}

impl StrikeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StrikeKind::Peremptory => "peremptory",
            StrikeKind::ForCause => "for_cause",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            StrikeKind::Peremptory => "Peremptory",
            StrikeKind::ForCause => "For Cause",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "peremptory" | "p" => Some(StrikeKind::Peremptory),
            "for_cause" | "for-cause" | "cause" | "c" => Some(StrikeKind::ForCause),
            _ => None,
        }
    }
}

/// One active challenge against a juror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Strike {
    pub kind: StrikeKind,
    pub party: Party,
}

impl Strike {
    #[must_use]
    pub const fn new(kind: StrikeKind, party: Party) -> Self {
        Self { kind, party }
    }

    #[must_use]
    pub const fn peremptory(party: Party) -> Self {
        Self::new(StrikeKind::Peremptory, party)
    }

    #[must_use]
    pub const fn for_cause(party: Party) -> Self {
        Self::new(StrikeKind::ForCause, party)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StrikeStateError {
    #[error("strike type is none but a party ({0}) was recorded")]
    PartyWithoutStrike(&'static str),
    #[error("strike type {0} has no party")]
    StrikeWithoutParty(&'static str),
}

/// Per-juror strike state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawStrikeState", into = "RawStrikeState")]
pub enum StrikeState {
    #[default]
    Clear,
    Struck(Strike),
}

impl StrikeState {
    #[must_use]
    pub const fn is_struck(self) -> bool {
        matches!(self, StrikeState::Struck(_))
    }

    #[must_use]
    pub const fn strike(self) -> Option<Strike> {
        match self {
            StrikeState::Clear => None,
            StrikeState::Struck(strike) => Some(strike),
        }
    }

    #[must_use]
    pub fn holds(self, kind: StrikeKind, party: Party) -> bool {
        self.strike() == Some(Strike::new(kind, party))
    }

    /// `none`, `peremptory` or `for_cause`.
    #[must_use]
    pub const fn type_str(self) -> &'static str {
        match self {
            StrikeState::Clear => "none",
            StrikeState::Struck(strike) => strike.kind.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawStrikeType {
    None,
    Peremptory,
    ForCause,
}

#[derive(Serialize, Deserialize)]
struct RawStrikeState {
    #[serde(rename = "type")]
    kind: RawStrikeType,
    party: Option<Party>,
}

impl TryFrom<RawStrikeState> for StrikeState {
    type Error = StrikeStateError;

    fn try_from(raw: RawStrikeState) -> Result<Self, Self::Error> {
        let kind = match raw.kind {
            RawStrikeType::None => {
                return match raw.party {
                    None => Ok(StrikeState::Clear),
                    Some(party) => Err(StrikeStateError::PartyWithoutStrike(party.as_str())),
                };
            }
            RawStrikeType::Peremptory => StrikeKind::Peremptory,
            RawStrikeType::ForCause => StrikeKind::ForCause,
        };
        let party = raw
            .party
            .ok_or(StrikeStateError::StrikeWithoutParty(kind.as_str()))?;
        Ok(StrikeState::Struck(Strike::new(kind, party)))
    }
}

impl From<StrikeState> for RawStrikeState {
    fn from(state: StrikeState) -> Self {
        match state {
            StrikeState::Clear => Self {
                kind: RawStrikeType::None,
                party: None,
            },
            StrikeState::Struck(strike) => Self {
                kind: match strike.kind {
                    StrikeKind::Peremptory => RawStrikeType::Peremptory,
                    StrikeKind::ForCause => RawStrikeType::ForCause,
                },
                party: Some(strike.party),
            },
        }
    }
}
