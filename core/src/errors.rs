//! Errors raised by workspace transitions.
//!
//! Every variant is recoverable: the transition that produced it is discarded
//! and the previous snapshot stays current.

use thiserror::Error;

use venire_types::{GridError, JurorId, JurorStatus, Party, SeatRole};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JuryError {
    #[error(
        "{} has used all {max} peremptory challenges",
        .party.display_name()
    )]
    CapacityExceeded { party: Party, max: u32 },
    #[error("no juror #{0}")]
    UnknownJuror(JurorId),
    #[error("juror id {0} is already in use")]
    DuplicateId(JurorId),
    #[error(
        "resizing would remove jurors {}; confirm truncation to proceed",
        join_ids(.dropped)
    )]
    DestructiveResize { dropped: Vec<JurorId> },
    #[error("juror id {id} is outside the grid (1..={max})")]
    IdOutOfRange { id: JurorId, max: JurorId },
    #[error(transparent)]
    InvalidDimensions(#[from] GridError),
    #[error("all {capacity} {} seats are taken", .role.as_str())]
    SeatingFull { role: SeatRole, capacity: u32 },
    #[error("juror #{id} is {} and cannot be seated", .status.as_str())]
    JurorUnavailable { id: JurorId, status: JurorStatus },
    #[error("peremptory maximum must be at least 1")]
    InvalidMax,
    #[error("message text must not be empty")]
    EmptyMessage,
}

fn join_ids(ids: &[JurorId]) -> String {
    ids.iter()
        .map(|id| id.badge())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destructive_resize_lists_badges() {
        let err = JuryError::DestructiveResize {
            dropped: vec![JurorId::new(34).unwrap(), JurorId::new(35).unwrap()],
        };
        assert_eq!(
            err.to_string(),
            "resizing would remove jurors #034, #035; confirm truncation to proceed"
        );
    }

    #[test]
    fn capacity_message_names_party() {
        let err = JuryError::CapacityExceeded {
            party: Party::Defense,
            max: 6,
        };
        assert_eq!(err.to_string(), "Defense has used all 6 peremptory challenges");
    }
}
