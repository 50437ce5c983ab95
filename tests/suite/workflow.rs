//! End-to-end workspace flows through the store

use venire_core::{Action, JuryError, SeatGrid, to_csv_string};
use venire_types::{
    ApprovalRole, JurorStatus, JurorTag, Party, Score, SeatRole, StartCorner, Strike,
};

use crate::common::{default_store, id, message, store_with};

#[test]
fn seventh_peremptory_is_refused_and_defense_untouched() {
    let mut store = default_store();
    for n in 1..=6 {
        store
            .dispatch(Action::ApplyStrike {
                id: id(n),
                strike: Strike::peremptory(Party::Plaintiff),
            })
            .unwrap();
    }

    let before = store.state().clone();
    let err = store
        .dispatch(Action::ApplyStrike {
            id: id(7),
            strike: Strike::peremptory(Party::Plaintiff),
        })
        .unwrap_err();
    assert_eq!(
        err,
        JuryError::CapacityExceeded {
            party: Party::Plaintiff,
            max: 6
        }
    );
    assert_eq!(store.state(), &before);
    assert_eq!(store.state().ledger().remaining_peremptory(Party::Plaintiff), 0);
    assert_eq!(store.state().ledger().remaining_peremptory(Party::Defense), 6);

    // For-cause strikes are never capped.
    store
        .dispatch(Action::ApplyStrike {
            id: id(7),
            strike: Strike::for_cause(Party::Plaintiff),
        })
        .unwrap();
    assert_eq!(store.state().ledger().party(Party::Plaintiff).cause_used, 1);
}

#[test]
fn bottom_left_corner_places_first_and_last_juror() {
    let store = default_store();
    let grid = SeatGrid::layout_for(store.state());
    assert_eq!(grid.juror_at(28), Some(id(1)));
    assert_eq!(grid.juror_at(6), Some(id(35)));
}

#[test]
fn corner_change_moves_juror_one() {
    let mut store = default_store();
    store
        .dispatch(Action::SetStartCorner(StartCorner::TopRight))
        .unwrap();
    let grid = SeatGrid::layout_for(store.state());
    assert_eq!(grid.juror_at(6), Some(id(1)));
    assert_eq!(grid.juror_at(28), Some(id(35)));
}

#[test]
fn deleted_then_restored_juror_starts_blank() {
    let mut store = default_store();
    store
        .dispatch(Action::ApplyStrike {
            id: id(5),
            strike: Strike::peremptory(Party::Defense),
        })
        .unwrap();
    store.dispatch(message(id(5), "Lead", "Owns a body shop")).unwrap();
    store
        .dispatch(Action::SetScore { id: id(5), score: 9 })
        .unwrap();

    store.dispatch(Action::Delete(id(5))).unwrap();
    let cell = store.state().layout().cell_index(id(5)).unwrap();
    assert_eq!(SeatGrid::layout_for(store.state()).juror_at(cell), None);
    assert_eq!(store.state().ledger().remaining_peremptory(Party::Defense), 6);

    store.dispatch(Action::Restore(id(5))).unwrap();
    let record = store.state().juror(id(5)).unwrap();
    assert_eq!(record.status(), JurorStatus::Pool);
    assert!(record.messages.is_empty());
    assert_eq!(record.score, Score::default());
    assert!(store.state().ledger_is_reconciled());
}

#[test]
fn renumbering_into_a_deleted_slot_carries_everything() {
    let mut store = default_store();
    store
        .dispatch(Action::Rename {
            id: id(4),
            name: "Jordan Reyes".to_string(),
        })
        .unwrap();
    store
        .dispatch(Action::ApplyStrike {
            id: id(4),
            strike: Strike::for_cause(Party::Defense),
        })
        .unwrap();
    store
        .dispatch(Action::SetTag {
            id: id(4),
            tag: Some(JurorTag::Red),
        })
        .unwrap();

    let err = store
        .dispatch(Action::ReassignId {
            old: id(4),
            new: id(20),
        })
        .unwrap_err();
    assert_eq!(err, JuryError::DuplicateId(id(20)));

    store.dispatch(Action::Delete(id(20))).unwrap();
    store
        .dispatch(Action::ReassignId {
            old: id(4),
            new: id(20),
        })
        .unwrap();

    let moved = store.state().juror(id(20)).unwrap();
    assert_eq!(moved.name, "Jordan Reyes");
    assert_eq!(moved.tag, Some(JurorTag::Red));
    assert_eq!(moved.status(), JurorStatus::Struck);
    assert!(store.state().juror(id(4)).is_none());
    assert_eq!(store.state().ledger().party(Party::Defense).cause_used, 1);
    assert!(store.state().ledger_is_reconciled());
}

#[test]
fn shrinking_the_grid_needs_confirmation() {
    let mut store = store_with(7, 5, StartCorner::BottomLeft, 6);
    store
        .dispatch(Action::ApplyStrike {
            id: id(33),
            strike: Strike::peremptory(Party::Plaintiff),
        })
        .unwrap();

    let err = store
        .dispatch(Action::Resize {
            columns: 6,
            rows: 5,
            confirm_truncate: false,
        })
        .unwrap_err();
    assert!(matches!(err, JuryError::DestructiveResize { ref dropped } if dropped.len() == 5));
    assert_eq!(store.state().layout().columns(), 7);

    store
        .dispatch(Action::Resize {
            columns: 6,
            rows: 5,
            confirm_truncate: true,
        })
        .unwrap();
    assert_eq!(store.state().live_jurors().count(), 30);
    assert_eq!(
        store.state().ledger().remaining_peremptory(Party::Plaintiff),
        6
    );

    let err = store
        .dispatch(Action::Resize {
            columns: 11,
            rows: 5,
            confirm_truncate: true,
        })
        .unwrap_err();
    assert!(matches!(err, JuryError::InvalidDimensions(_)));
}

#[test]
fn seating_and_approvals_feed_the_summary() {
    let mut store = default_store();
    for n in 1..=3 {
        store
            .dispatch(Action::Seat {
                id: id(n),
                role: SeatRole::Juror,
            })
            .unwrap();
    }
    store
        .dispatch(Action::Seat {
            id: id(4),
            role: SeatRole::Alternate,
        })
        .unwrap();
    for role in [ApprovalRole::Lead, ApprovalRole::Second] {
        store
            .dispatch(Action::ToggleApproval { id: id(2), role })
            .unwrap();
    }
    store.dispatch(message(id(9), "Second", "Nodding a lot")).unwrap();
    store
        .dispatch(Action::ApplyStrike {
            id: id(3),
            strike: Strike::peremptory(Party::Defense),
        })
        .unwrap();

    let summary = store.state().summary();
    assert_eq!(summary.jurors, 35);
    assert_eq!(summary.seated, 2);
    assert_eq!(summary.alternates, 1);
    assert_eq!(summary.approved, 1);
    assert_eq!(summary.new_messages, 1);
    assert_eq!(summary.struck_peremptory, 1);
    assert_eq!(summary.remaining_defense, 5);
    assert_eq!(summary.remaining_plaintiff, 6);

    store.dispatch(Action::Select(id(9))).unwrap();
    assert_eq!(store.state().summary().new_messages, 0);
}

#[test]
fn export_reflects_swaps() {
    let mut store = default_store();
    store
        .dispatch(Action::Rename {
            id: id(1),
            name: "First".to_string(),
        })
        .unwrap();
    store.dispatch(message(id(2), "Lead", "Electrician")).unwrap();
    store
        .dispatch(Action::SwapIds { a: id(1), b: id(2) })
        .unwrap();

    let csv = to_csv_string(store.state()).unwrap();
    let rows: Vec<_> = csv.lines().skip(1).take(2).collect();
    assert_eq!(rows[0], "1,,false,none,true,1,Electrician");
    assert_eq!(rows[1], "2,First,false,none,false,0,");
}

#[test]
fn lowering_the_allowance_below_usage_floors_remaining() {
    let mut store = default_store();
    for n in 1..=4 {
        store
            .dispatch(Action::ApplyStrike {
                id: id(n),
                strike: Strike::peremptory(Party::Defense),
            })
            .unwrap();
    }
    store
        .dispatch(Action::SetMaxPeremptory {
            party: Party::Defense,
            max: 2,
        })
        .unwrap();
    assert_eq!(store.state().ledger().remaining_peremptory(Party::Defense), 0);
    assert!(!store.state().ledger().can_strike(Party::Defense));

    assert_eq!(
        store
            .dispatch(Action::SetMaxPeremptory {
                party: Party::Defense,
                max: 0,
            })
            .unwrap_err(),
        JuryError::InvalidMax
    );
}
