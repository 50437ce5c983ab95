//! Workspace state and the reducer that drives it.
//!
//! [`JuryState`] is an immutable snapshot. Every mutation is an [`Action`]
//! reduced into a *new* snapshot; [`JuryStore`] swaps it in only when the
//! reduction succeeds, so a failed transition is never observable.

use std::collections::BTreeMap;
use std::time::SystemTime;

use venire_types::{
    ApprovalRole, GridLayout, JurorId, JurorRecord, JurorStatus, JurorTag, Message, MessageKind,
    NonEmptyString, Party, SeatRole, SeatingLimits, StartCorner, Strike, StrikeAllowance,
    StrikeKind, StrikeState,
};

use crate::{JuryError, StrikeLedger, script};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JuryState {
    pub(crate) jurors: BTreeMap<JurorId, JurorRecord>,
    pub(crate) ledger: StrikeLedger,
    pub(crate) layout: GridLayout,
    pub(crate) seating: SeatingLimits,
    pub(crate) staff_notes: String,
    pub(crate) script: String,
    pub(crate) selected: Option<JurorId>,
}

/// Every mutation the workspace supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Select(JurorId),
    ClearSelection,
    PostMessage {
        id: JurorId,
        sender: String,
        text: String,
        kind: MessageKind,
        at: SystemTime,
    },
    SetStaffNotes(String),
    SetScript(String),
    ResetScript,
    ToggleApproval {
        id: JurorId,
        role: ApprovalRole,
    },
    SetScore {
        id: JurorId,
        score: i64,
    },
    SetTag {
        id: JurorId,
        tag: Option<JurorTag>,
    },
    Rename {
        id: JurorId,
        name: String,
    },
    SetJurorNotes {
        id: JurorId,
        notes: String,
    },
    ApplyStrike {
        id: JurorId,
        strike: Strike,
    },
    RemoveStrike(JurorId),
    SetMaxPeremptory {
        party: Party,
        max: u32,
    },
    Resize {
        columns: u32,
        rows: u32,
        confirm_truncate: bool,
    },
    SetStartCorner(StartCorner),
    ReassignId {
        old: JurorId,
        new: JurorId,
    },
    SwapIds {
        a: JurorId,
        b: JurorId,
    },
    Delete(JurorId),
    Restore(JurorId),
    Seat {
        id: JurorId,
        role: SeatRole,
    },
    Unseat(JurorId),
}

impl Action {
    /// Short label for logs. Never includes message or note text.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Action::Select(_) => "select",
            Action::ClearSelection => "clear_selection",
            Action::PostMessage { .. } => "post_message",
            Action::SetStaffNotes(_) => "set_staff_notes",
            Action::SetScript(_) => "set_script",
            Action::ResetScript => "reset_script",
            Action::ToggleApproval { .. } => "toggle_approval",
            Action::SetScore { .. } => "set_score",
            Action::SetTag { .. } => "set_tag",
            Action::Rename { .. } => "rename",
            Action::SetJurorNotes { .. } => "set_juror_notes",
            Action::ApplyStrike { .. } => "apply_strike",
            Action::RemoveStrike(_) => "remove_strike",
            Action::SetMaxPeremptory { .. } => "set_max_peremptory",
            Action::Resize { .. } => "resize",
            Action::SetStartCorner(_) => "set_start_corner",
            Action::ReassignId { .. } => "reassign_id",
            Action::SwapIds { .. } => "swap_ids",
            Action::Delete(_) => "delete",
            Action::Restore(_) => "restore",
            Action::Seat { .. } => "seat",
            Action::Unseat(_) => "unseat",
        }
    }
}

/// Header counts for the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub jurors: usize,
    pub new_messages: usize,
    pub approved: usize,
    pub seated: usize,
    pub alternates: usize,
    pub struck_peremptory: usize,
    pub struck_for_cause: usize,
    pub remaining_plaintiff: u32,
    pub remaining_defense: u32,
}

impl JuryState {
    /// A fresh workspace with one blank juror per seat.
    #[must_use]
    pub fn seeded(layout: GridLayout, allowance: StrikeAllowance, seating: SeatingLimits) -> Self {
        let jurors = (0..layout.total_seats() as u32)
            .map(JurorId::from_ordinal)
            .map(|id| (id, JurorRecord::new(id, String::new())))
            .collect();
        Self {
            jurors,
            ledger: StrikeLedger::new(allowance),
            layout,
            seating,
            staff_notes: String::new(),
            script: script::DEFAULT_SCRIPT.to_string(),
            selected: None,
        }
    }

    #[must_use]
    pub fn juror(&self, id: JurorId) -> Option<&JurorRecord> {
        self.jurors.get(&id)
    }

    /// All records in id order, tombstones included.
    pub fn jurors(&self) -> impl Iterator<Item = &JurorRecord> {
        self.jurors.values()
    }

    /// Non-deleted records in id order.
    pub fn live_jurors(&self) -> impl Iterator<Item = &JurorRecord> {
        self.jurors.values().filter(|record| !record.deleted)
    }

    #[must_use]
    pub const fn ledger(&self) -> &StrikeLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn layout(&self) -> &GridLayout {
        &self.layout
    }

    #[must_use]
    pub const fn seating(&self) -> SeatingLimits {
        self.seating
    }

    #[must_use]
    pub fn staff_notes(&self) -> &str {
        &self.staff_notes
    }

    #[must_use]
    pub fn script(&self) -> &str {
        &self.script
    }

    #[must_use]
    pub const fn selected(&self) -> Option<JurorId> {
        self.selected
    }

    /// Highest id with a record, tombstones included.
    #[must_use]
    pub fn max_id(&self) -> Option<JurorId> {
        self.jurors.keys().next_back().copied()
    }

    pub(crate) fn live(&self, id: JurorId) -> Result<&JurorRecord, JuryError> {
        self.jurors
            .get(&id)
            .filter(|record| !record.deleted)
            .ok_or(JuryError::UnknownJuror(id))
    }

    /// Clone the state, apply `edit` to the live record `id`, return the result.
    fn with_juror(
        &self,
        id: JurorId,
        edit: impl FnOnce(&mut JurorRecord),
    ) -> Result<Self, JuryError> {
        let mut record = self.live(id)?.clone();
        edit(&mut record);
        let mut next = self.clone();
        next.jurors.insert(id, record);
        Ok(next)
    }

    pub fn reduce(&self, action: Action) -> Result<Self, JuryError> {
        match action {
            Action::Select(id) => self.select_juror(id),
            Action::ClearSelection => Ok(Self {
                selected: None,
                ..self.clone()
            }),
            Action::PostMessage {
                id,
                sender,
                text,
                kind,
                at,
            } => self.post_message(id, &sender, text, kind, at),
            Action::SetStaffNotes(notes) => Ok(Self {
                staff_notes: notes,
                ..self.clone()
            }),
            Action::SetScript(script) => Ok(Self {
                script,
                ..self.clone()
            }),
            Action::ResetScript => Ok(Self {
                script: script::DEFAULT_SCRIPT.to_string(),
                ..self.clone()
            }),
            Action::ToggleApproval { id, role } => self.with_juror(id, |record| {
                record.approvals = record.approvals.toggled(role);
            }),
            Action::SetScore { id, score } => self.with_juror(id, |record| {
                record.score = venire_types::Score::clamped(score);
            }),
            Action::SetTag { id, tag } => self.with_juror(id, |record| record.tag = tag),
            Action::Rename { id, name } => {
                self.with_juror(id, |record| record.name = name.trim().to_string())
            }
            Action::SetJurorNotes { id, notes } => {
                self.with_juror(id, |record| record.notes = notes)
            }
            Action::ApplyStrike { id, strike } => self.apply_strike(id, strike),
            Action::RemoveStrike(id) => self.remove_strike(id),
            Action::SetMaxPeremptory { party, max } => Ok(Self {
                ledger: self.ledger.with_max(party, max)?,
                ..self.clone()
            }),
            Action::Resize {
                columns,
                rows,
                confirm_truncate,
            } => self.resize_grid(columns, rows, confirm_truncate),
            Action::SetStartCorner(corner) => Ok(Self {
                layout: self.layout.with_start_corner(corner),
                ..self.clone()
            }),
            Action::ReassignId { old, new } => self.reassign_id(old, new),
            Action::SwapIds { a, b } => self.swap_ids(a, b),
            Action::Delete(id) => self.delete_juror(id),
            Action::Restore(id) => self.restore_juror(id),
            Action::Seat { id, role } => self.seat_juror(id, role),
            Action::Unseat(id) => self.unseat_juror(id),
        }
    }

    fn select_juror(&self, id: JurorId) -> Result<Self, JuryError> {
        let mut next = self.with_juror(id, |record| record.unread = false)?;
        next.selected = Some(id);
        Ok(next)
    }

    fn post_message(
        &self,
        id: JurorId,
        sender: &str,
        text: String,
        kind: MessageKind,
        at: SystemTime,
    ) -> Result<Self, JuryError> {
        let text = NonEmptyString::new(text).map_err(|_| JuryError::EmptyMessage)?;
        let sender = match sender.trim() {
            "" => "You",
            trimmed => trimmed,
        };
        let selected = self.selected == Some(id);
        self.with_juror(id, |record| {
            record.messages.push(Message::new(sender, text, kind, at));
            if !selected {
                record.unread = true;
            }
        })
    }

    fn apply_strike(&self, id: JurorId, strike: Strike) -> Result<Self, JuryError> {
        let (ledger, record) = self.ledger.apply_strike(self.live(id)?, strike)?;
        let mut next = self.clone();
        next.ledger = ledger;
        next.jurors.insert(id, record);
        tracing::debug!(
            juror = id.value(),
            kind = strike.kind.as_str(),
            party = strike.party.as_str(),
            "Strike applied"
        );
        Ok(next)
    }

    fn remove_strike(&self, id: JurorId) -> Result<Self, JuryError> {
        let (ledger, record) = self.ledger.remove_strike(self.live(id)?)?;
        let mut next = self.clone();
        next.ledger = ledger;
        next.jurors.insert(id, record);
        Ok(next)
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            remaining_plaintiff: self.ledger.remaining_peremptory(Party::Plaintiff),
            remaining_defense: self.ledger.remaining_peremptory(Party::Defense),
            ..Summary::default()
        };
        for record in self.live_jurors() {
            summary.jurors += 1;
            if record.unread {
                summary.new_messages += 1;
            }
            if record.is_approved() {
                summary.approved += 1;
            }
            match record.status() {
                JurorStatus::Seated => summary.seated += 1,
                JurorStatus::Alternate => summary.alternates += 1,
                JurorStatus::Pool | JurorStatus::Deleted => {}
                JurorStatus::Struck => match record.strike {
                    StrikeState::Struck(Strike {
                        kind: StrikeKind::Peremptory,
                        ..
                    }) => summary.struck_peremptory += 1,
                    StrikeState::Struck(Strike {
                        kind: StrikeKind::ForCause,
                        ..
                    }) => summary.struck_for_cause += 1,
                    StrikeState::Clear => {}
                },
            }
        }
        summary
    }

    /// Whether the cached ledger matches a recount of the records.
    #[must_use]
    pub fn ledger_is_reconciled(&self) -> bool {
        self.ledger.tally(self.jurors.values()) == self.ledger
    }
}

/// Owns the current snapshot and commits reduced snapshots on success.
#[derive(Debug, Clone)]
pub struct JuryStore {
    state: JuryState,
}

impl JuryStore {
    #[must_use]
    pub fn new(state: JuryState) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn state(&self) -> &JuryState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> JuryState {
        self.state
    }

    pub fn dispatch(&mut self, action: Action) -> Result<&JuryState, JuryError> {
        let name = action.name();
        match self.state.reduce(action) {
            Ok(next) => {
                self.state = next;
                tracing::debug!(action = name, "Committed workspace transition");
                Ok(&self.state)
            }
            Err(err) => {
                tracing::debug!(action = name, "Rejected workspace transition: {err}");
                Err(err)
            }
        }
    }
}
