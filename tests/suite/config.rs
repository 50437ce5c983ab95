//! Config-driven workspace limits

use venire_config::VenireConfig;
use venire_core::{Action, JuryError, JuryState, JuryStore, SeatGrid};
use venire_types::{Party, SeatRole, Strike};

use crate::common::id;

fn store_from(toml: &str) -> JuryStore {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, toml).unwrap();
    let settings = VenireConfig::load_from(&path)
        .unwrap()
        .unwrap()
        .resolve()
        .unwrap();
    JuryStore::new(JuryState::seeded(
        settings.grid,
        settings.strikes,
        settings.seating,
    ))
}

#[test]
fn seating_limits_come_from_config() {
    let mut store = store_from("[seating]\njury_size = 2\nalternates = 0\n");
    for n in 1..=2 {
        store
            .dispatch(Action::Seat {
                id: id(n),
                role: SeatRole::Juror,
            })
            .unwrap();
    }
    assert_eq!(
        store
            .dispatch(Action::Seat {
                id: id(3),
                role: SeatRole::Juror,
            })
            .unwrap_err(),
        JuryError::SeatingFull {
            role: SeatRole::Juror,
            capacity: 2
        }
    );
    assert!(matches!(
        store.dispatch(Action::Seat {
            id: id(3),
            role: SeatRole::Alternate,
        }),
        Err(JuryError::SeatingFull { capacity: 0, .. })
    ));
}

#[test]
fn grid_and_allowance_come_from_config() {
    let mut store = store_from(
        "[grid]\ncolumns = 4\nrows = 3\nstart_corner = \"top-left\"\n\n[strikes]\ndefense_peremptory = 1\n",
    );
    assert_eq!(store.state().live_jurors().count(), 12);
    let grid = SeatGrid::layout_for(store.state());
    assert_eq!(grid.juror_at(0), Some(id(1)));
    assert_eq!(grid.juror_at(11), Some(id(12)));

    store
        .dispatch(Action::ApplyStrike {
            id: id(1),
            strike: Strike::peremptory(Party::Defense),
        })
        .unwrap();
    assert!(matches!(
        store.dispatch(Action::ApplyStrike {
            id: id(2),
            strike: Strike::peremptory(Party::Defense),
        }),
        Err(JuryError::CapacityExceeded { max: 1, .. })
    ));
}
