//! The per-juror aggregate record.
//!
//! Everything the team tracks about one juror lives in a single
//! [`JurorRecord`], keyed by its [`JurorId`]. Renumbering or swapping a juror
//! moves the whole record, so no per-id side table can be left behind.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::{JurorId, NonEmptyString, StrikeState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Normal,
    Alert,
    Flag,
}

impl MessageKind {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "alert" => Some(Self::Alert),
            "flag" => Some(Self::Flag),
            _ => None,
        }
    }
}

/// A team chat message about one juror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: NonEmptyString,
    pub sender: String,
    #[serde(default)]
    pub kind: MessageKind,
    pub timestamp: SystemTime,
}

impl Message {
    #[must_use]
    pub fn new(
        sender: impl Into<String>,
        text: NonEmptyString,
        kind: MessageKind,
        timestamp: SystemTime,
    ) -> Self {
        Self {
            text,
            sender: sender.into(),
            kind,
            timestamp,
        }
    }

    /// `sender: text`, the form used in transcripts and prompts.
    #[must_use]
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.sender, self.text.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalRole {
    Lead,
    Second,
}

impl ApprovalRole {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lead" => Some(Self::Lead),
            "second" => Some(Self::Second),
            _ => None,
        }
    }
}

/// Sign-off from lead and second chair. A juror is approved only with both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Approvals {
    pub lead: bool,
    pub second: bool,
}

impl Approvals {
    #[must_use]
    pub const fn approved(self) -> bool {
        self.lead && self.second
    }

    #[must_use]
    pub const fn toggled(mut self, role: ApprovalRole) -> Self {
        match role {
            ApprovalRole::Lead => self.lead = !self.lead,
            ApprovalRole::Second => self.second = !self.second,
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// 8-10: favorable.
    High,
    /// 5-7: neutral.
    Medium,
    /// 1-4: unfavorable.
    Low,
}

/// Team rating on a 1-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    pub const HIGH_THRESHOLD: u8 = 8;
    pub const MEDIUM_THRESHOLD: u8 = 5;

    /// Clamp any input into `MIN..=MAX`.
    #[must_use]
    pub fn clamped(raw: i64) -> Self {
        Self(raw.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn band(self) -> ScoreBand {
        if self.0 >= Self::HIGH_THRESHOLD {
            ScoreBand::High
        } else if self.0 >= Self::MEDIUM_THRESHOLD {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }
}

impl Default for Score {
    fn default() -> Self {
        Self(Self::MEDIUM_THRESHOLD)
    }
}

impl From<u8> for Score {
    fn from(value: u8) -> Self {
        Self::clamped(i64::from(value))
    }
}

impl From<Score> for u8 {
    fn from(value: Score) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JurorTag {
    Green,
    Yellow,
    Red,
}

impl JurorTag {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "green" => Some(Self::Green),
            "yellow" => Some(Self::Yellow),
            "red" => Some(Self::Red),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatRole {
    Juror,
    Alternate,
}

impl SeatRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Juror => "juror",
            Self::Alternate => "alternate",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "juror" | "seated" => Some(Self::Juror),
            "alternate" | "alt" => Some(Self::Alternate),
            _ => None,
        }
    }
}

/// Box assignment for a juror who has been empanelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub role: SeatRole,
    /// 0-based position within the role.
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JurorStatus {
    Pool,
    Seated,
    Alternate,
    Struck,
    Deleted,
}

impl JurorStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pool => "pool",
            Self::Seated => "seated",
            Self::Alternate => "alternate",
            Self::Struck => "struck",
            Self::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurorRecord {
    pub id: JurorId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub strike: StrikeState,
    #[serde(default)]
    pub seat: Option<Seat>,
    #[serde(default)]
    pub score: Score,
    #[serde(default)]
    pub tag: Option<JurorTag>,
    #[serde(default)]
    pub approvals: Approvals,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub notes: String,
}

impl JurorRecord {
    #[must_use]
    pub fn new(id: JurorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            deleted: false,
            strike: StrikeState::Clear,
            seat: None,
            score: Score::default(),
            tag: None,
            approvals: Approvals::default(),
            messages: Vec::new(),
            unread: false,
            notes: String::new(),
        }
    }

    /// A cleared record that keeps only the id. Its seat renders empty.
    #[must_use]
    pub fn tombstone(id: JurorId) -> Self {
        Self {
            deleted: true,
            ..Self::new(id, String::new())
        }
    }

    #[must_use]
    pub fn status(&self) -> JurorStatus {
        if self.deleted {
            return JurorStatus::Deleted;
        }
        if self.strike.is_struck() {
            return JurorStatus::Struck;
        }
        match self.seat.map(|seat| seat.role) {
            Some(SeatRole::Juror) => JurorStatus::Seated,
            Some(SeatRole::Alternate) => JurorStatus::Alternate,
            None => JurorStatus::Pool,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Juror {}", self.id)
        } else {
            self.name.clone()
        }
    }

    #[must_use]
    pub const fn is_approved(&self) -> bool {
        self.approvals.approved()
    }

    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
