//! Per-party challenge counters.
//!
//! The ledger is a cache over the jurors' own [`StrikeState`]s:
//! `peremptory_used[p]` always equals the number of live jurors holding a
//! peremptory strike for `p`, and likewise for `cause_used`. Transitions here
//! are pure; they return a new ledger and record instead of mutating.

use serde::{Deserialize, Serialize};

use venire_types::{JurorRecord, Party, Strike, StrikeAllowance, StrikeKind, StrikeState};

use crate::JuryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyTally {
    pub peremptory_used: u32,
    pub max_peremptory: u32,
    pub cause_used: u32,
}

impl PartyTally {
    #[must_use]
    pub const fn with_max(max_peremptory: u32) -> Self {
        Self {
            peremptory_used: 0,
            max_peremptory,
            cause_used: 0,
        }
    }

    /// `max - used`, floored at zero.
    #[must_use]
    pub const fn remaining_peremptory(&self) -> u32 {
        self.max_peremptory.saturating_sub(self.peremptory_used)
    }

    #[must_use]
    pub const fn can_strike(&self) -> bool {
        self.peremptory_used < self.max_peremptory
    }
}

#[derive(Deserialize)]
struct RawStrikeLedger {
    plaintiff: PartyTally,
    defense: PartyTally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStrikeLedger")]
pub struct StrikeLedger {
    plaintiff: PartyTally,
    defense: PartyTally,
}

impl TryFrom<RawStrikeLedger> for StrikeLedger {
    type Error = JuryError;

    fn try_from(raw: RawStrikeLedger) -> Result<Self, Self::Error> {
        if raw.plaintiff.max_peremptory == 0 || raw.defense.max_peremptory == 0 {
            return Err(JuryError::InvalidMax);
        }
        Ok(Self {
            plaintiff: raw.plaintiff,
            defense: raw.defense,
        })
    }
}

impl Default for StrikeLedger {
    fn default() -> Self {
        Self::new(StrikeAllowance::default())
    }
}

impl StrikeLedger {
    #[must_use]
    pub fn new(allowance: StrikeAllowance) -> Self {
        Self {
            plaintiff: PartyTally::with_max(allowance.max_for(Party::Plaintiff)),
            defense: PartyTally::with_max(allowance.max_for(Party::Defense)),
        }
    }

    #[must_use]
    pub const fn party(&self, party: Party) -> &PartyTally {
        match party {
            Party::Plaintiff => &self.plaintiff,
            Party::Defense => &self.defense,
        }
    }

    fn party_mut(&mut self, party: Party) -> &mut PartyTally {
        match party {
            Party::Plaintiff => &mut self.plaintiff,
            Party::Defense => &mut self.defense,
        }
    }

    #[must_use]
    pub const fn remaining_peremptory(&self, party: Party) -> u32 {
        self.party(party).remaining_peremptory()
    }

    #[must_use]
    pub const fn can_strike(&self, party: Party) -> bool {
        self.party(party).can_strike()
    }

    /// Charge `strike` against `record`.
    ///
    /// Re-applying the strike the juror already holds is a no-op. A different
    /// prior strike is released before the new one is checked against the cap,
    /// so switching a juror between parties or kinds never double-counts.
    pub fn apply_strike(
        &self,
        record: &JurorRecord,
        strike: Strike,
    ) -> Result<(Self, JurorRecord), JuryError> {
        if record.deleted {
            return Err(JuryError::UnknownJuror(record.id));
        }
        if record.strike == StrikeState::Struck(strike) {
            return Ok((*self, record.clone()));
        }

        let mut ledger = *self;
        if let Some(prior) = record.strike.strike() {
            ledger.release(prior);
        }
        ledger.charge(strike)?;

        let mut record = record.clone();
        record.strike = StrikeState::Struck(strike);
        record.seat = None;
        Ok((ledger, record))
    }

    /// Clear whatever strike `record` holds. Idempotent.
    pub fn remove_strike(&self, record: &JurorRecord) -> Result<(Self, JurorRecord), JuryError> {
        if record.deleted {
            return Err(JuryError::UnknownJuror(record.id));
        }
        let mut ledger = *self;
        let mut record = record.clone();
        if let Some(prior) = record.strike.strike() {
            ledger.release(prior);
            record.strike = StrikeState::Clear;
        }
        Ok((ledger, record))
    }

    fn charge(&mut self, strike: Strike) -> Result<(), JuryError> {
        let tally = self.party_mut(strike.party);
        match strike.kind {
            StrikeKind::Peremptory => {
                if !tally.can_strike() {
                    return Err(JuryError::CapacityExceeded {
                        party: strike.party,
                        max: tally.max_peremptory,
                    });
                }
                tally.peremptory_used += 1;
            }
            StrikeKind::ForCause => tally.cause_used += 1,
        }
        Ok(())
    }

    /// Undo one charge. Saturates at zero.
    pub(crate) fn release(&mut self, strike: Strike) {
        let tally = self.party_mut(strike.party);
        match strike.kind {
            StrikeKind::Peremptory => {
                tally.peremptory_used = tally.peremptory_used.saturating_sub(1);
            }
            StrikeKind::ForCause => tally.cause_used = tally.cause_used.saturating_sub(1),
        }
    }

    /// Change a party's peremptory allowance. May drop below the used count;
    /// `remaining_peremptory` then reports zero.
    pub fn with_max(&self, party: Party, max: u32) -> Result<Self, JuryError> {
        if max == 0 {
            return Err(JuryError::InvalidMax);
        }
        let mut ledger = *self;
        ledger.party_mut(party).max_peremptory = max;
        Ok(ledger)
    }

    /// Rebuild the counters from juror records, keeping this ledger's maxima.
    #[must_use]
    pub fn tally<'a>(&self, records: impl IntoIterator<Item = &'a JurorRecord>) -> Self {
        let mut ledger = Self {
            plaintiff: PartyTally::with_max(self.plaintiff.max_peremptory),
            defense: PartyTally::with_max(self.defense.max_peremptory),
        };
        for record in records {
            if record.deleted {
                continue;
            }
            if let Some(strike) = record.strike.strike() {
                let tally = ledger.party_mut(strike.party);
                match strike.kind {
                    StrikeKind::Peremptory => tally.peremptory_used += 1,
                    StrikeKind::ForCause => tally.cause_used += 1,
                }
            }
        }
        ledger
    }
}
