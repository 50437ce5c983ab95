//! Identity-changing transitions: resize, renumber, swap, delete, restore.
//!
//! Each one moves or replaces whole [`JurorRecord`]s, so a juror's messages,
//! strike, score, approvals, notes and seat always travel with it.

use venire_types::{JurorId, JurorRecord};

use crate::{JuryError, JuryState};

impl JuryState {
    /// Change the grid dimensions.
    ///
    /// Growing appends blank jurors with ids continuing after the current
    /// maximum. Shrinking drops every record whose id exceeds the new seat
    /// count; if any of them is live the call fails with
    /// [`JuryError::DestructiveResize`] unless `confirm_truncate` is set.
    pub fn resize_grid(
        &self,
        columns: u32,
        rows: u32,
        confirm_truncate: bool,
    ) -> Result<Self, JuryError> {
        let layout = self.layout.with_dimensions(columns, rows)?;
        let total = layout.total_seats() as u32;

        let dropped: Vec<JurorId> = self
            .live_jurors()
            .filter(|record| record.id.value() > total)
            .map(|record| record.id)
            .collect();
        if !dropped.is_empty() && !confirm_truncate {
            return Err(JuryError::DestructiveResize { dropped });
        }

        let mut next = self.clone();
        next.layout = layout;
        for record in self.jurors.values().filter(|r| r.id.value() > total) {
            if let Some(strike) = record.strike.strike()
                && !record.deleted
            {
                next.ledger.release(strike);
            }
            next.jurors.remove(&record.id);
        }
        if next.selected.is_some_and(|id| id.value() > total) {
            next.selected = None;
        }

        let start = next.max_id().map_or(1, |id| id.value() + 1);
        for n in start..=total {
            let id = JurorId::from_ordinal(n - 1);
            next.jurors.insert(id, JurorRecord::new(id, String::new()));
        }

        if !dropped.is_empty() {
            tracing::info!(
                dropped = dropped.len(),
                columns,
                rows,
                "Truncated jurors beyond resized grid"
            );
        }
        Ok(next)
    }

    /// Move juror `old` to id `new`, carrying its whole record.
    ///
    /// A deleted tombstone at `new` is replaced. The vacated id renders empty
    /// until a juror is restored or moved there.
    pub fn reassign_id(&self, old: JurorId, new: JurorId) -> Result<Self, JuryError> {
        let record = self.live(old)?;
        if !self.layout.contains(new) {
            return Err(JuryError::IdOutOfRange {
                id: new,
                max: self.layout.max_id(),
            });
        }
        if old == new {
            return Ok(self.clone());
        }
        if self.jurors.get(&new).is_some_and(|r| !r.deleted) {
            return Err(JuryError::DuplicateId(new));
        }

        let mut moved = record.clone();
        moved.id = new;
        let mut next = self.clone();
        next.jurors.remove(&old);
        next.jurors.insert(new, moved);
        if next.selected == Some(old) {
            next.selected = Some(new);
        }
        tracing::debug!(old = old.value(), new = new.value(), "Reassigned juror id");
        Ok(next)
    }

    /// Exchange two jurors' ids. Applying it twice restores the original keying.
    pub fn swap_ids(&self, a: JurorId, b: JurorId) -> Result<Self, JuryError> {
        let first = self.live(a)?;
        let second = self.live(b)?;
        if a == b {
            return Ok(self.clone());
        }

        let mut first = first.clone();
        let mut second = second.clone();
        first.id = b;
        second.id = a;

        let mut next = self.clone();
        next.jurors.insert(b, first);
        next.jurors.insert(a, second);
        next.selected = match next.selected {
            Some(id) if id == a => Some(b),
            Some(id) if id == b => Some(a),
            other => other,
        };
        Ok(next)
    }

    /// Tombstone a juror, releasing its strike from the ledger first.
    pub fn delete_juror(&self, id: JurorId) -> Result<Self, JuryError> {
        let record = self.live(id)?;
        let mut next = self.clone();
        if let Some(strike) = record.strike.strike() {
            next.ledger.release(strike);
        }
        next.jurors.insert(id, JurorRecord::tombstone(id));
        if next.selected == Some(id) {
            next.selected = None;
        }
        tracing::debug!(juror = id.value(), "Deleted juror");
        Ok(next)
    }

    /// Bring a tombstoned or vacant id back as a blank pool juror.
    ///
    /// Restoring a live juror is a no-op.
    pub fn restore_juror(&self, id: JurorId) -> Result<Self, JuryError> {
        match self.jurors.get(&id) {
            Some(record) if !record.deleted => return Ok(self.clone()),
            Some(_) => {}
            None if self.layout.contains(id) => {}
            None => {
                return Err(JuryError::IdOutOfRange {
                    id,
                    max: self.layout.max_id(),
                });
            }
        }
        let mut next = self.clone();
        next.jurors.insert(id, JurorRecord::new(id, String::new()));
        Ok(next)
    }
}
