//! Jury box assignments.

use venire_types::{JurorId, JurorRecord, JurorStatus, Seat, SeatRole};

use crate::{JuryError, JuryState};

impl JuryState {
    /// Jurors holding `role` seats, ordered by seat index.
    #[must_use]
    pub fn seated(&self, role: SeatRole) -> Vec<&JurorRecord> {
        let mut seated: Vec<_> = self
            .live_jurors()
            .filter(|record| record.seat.is_some_and(|seat| seat.role == role))
            .collect();
        seated.sort_by_key(|record| record.seat.map(|seat| seat.index));
        seated
    }

    const fn capacity(&self, role: SeatRole) -> u32 {
        match role {
            SeatRole::Juror => self.seating.jury_size(),
            SeatRole::Alternate => self.seating.alternates(),
        }
    }

    /// Seat a pool juror in the lowest free `role` position.
    pub fn seat_juror(&self, id: JurorId, role: SeatRole) -> Result<Self, JuryError> {
        let record = self.jurors.get(&id).ok_or(JuryError::UnknownJuror(id))?;
        match record.status() {
            status @ (JurorStatus::Struck | JurorStatus::Deleted) => {
                return Err(JuryError::JurorUnavailable { id, status });
            }
            JurorStatus::Seated | JurorStatus::Alternate
                if record.seat.is_some_and(|seat| seat.role == role) =>
            {
                return Ok(self.clone());
            }
            _ => {}
        }

        let taken: Vec<u32> = self
            .seated(role)
            .into_iter()
            .filter(|other| other.id != id)
            .filter_map(|other| other.seat.map(|seat| seat.index))
            .collect();
        let capacity = self.capacity(role);
        let Some(index) = (0..capacity).find(|index| !taken.contains(index)) else {
            return Err(JuryError::SeatingFull { role, capacity });
        };

        let mut record = record.clone();
        record.seat = Some(Seat { role, index });
        let mut next = self.clone();
        next.jurors.insert(id, record);
        tracing::debug!(juror = id.value(), role = role.as_str(), index, "Seated juror");
        Ok(next)
    }

    pub fn unseat_juror(&self, id: JurorId) -> Result<Self, JuryError> {
        let record = self.live(id)?;
        if record.seat.is_none() {
            return Ok(self.clone());
        }
        let mut record = record.clone();
        record.seat = None;
        let mut next = self.clone();
        next.jurors.insert(id, record);
        Ok(next)
    }
}
