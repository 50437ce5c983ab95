//! Snapshot and config persistence across a restart

use std::fs;

use venire_config::VenireConfig;
use venire_core::{Action, persistence};
use venire_types::{GridLayout, Party, SeatRole, StartCorner, Strike};

use crate::common::{default_store, id, message};

#[test]
fn restart_reproduces_ledger_and_grid() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    let data_dir = dir.path().join("data");
    fs::write(
        &config_path,
        format!(
            "# trial team settings\n[strikes]\nplaintiff_peremptory = 3\n\n[storage]\ndata_dir = '{}'\n",
            data_dir.display()
        ),
    )
    .unwrap();

    let settings = VenireConfig::load_from(&config_path)
        .unwrap()
        .unwrap()
        .resolve()
        .unwrap();
    let mut store = venire_core::JuryStore::new(venire_core::JuryState::seeded(
        settings.grid,
        settings.strikes,
        settings.seating,
    ));
    store
        .dispatch(Action::ApplyStrike {
            id: id(2),
            strike: Strike::peremptory(Party::Plaintiff),
        })
        .unwrap();
    store
        .dispatch(Action::SetStartCorner(StartCorner::TopRight))
        .unwrap();
    store
        .dispatch(Action::Seat {
            id: id(8),
            role: SeatRole::Alternate,
        })
        .unwrap();
    store.dispatch(message(id(8), "Lead", "Prior jury service")).unwrap();

    venire_config::ensure_data_dir(&settings.data_dir).unwrap();
    persistence::save(store.state(), &settings.snapshot_path()).unwrap();
    VenireConfig::persist_grid(&config_path, *store.state().layout()).unwrap();

    let written = fs::read_to_string(&config_path).unwrap();
    assert!(written.starts_with("# trial team settings"));
    assert!(written.contains("start_corner = \"top-right\""));

    let settings = VenireConfig::load_from(&config_path)
        .unwrap()
        .unwrap()
        .resolve()
        .unwrap();
    let restored = persistence::load(&settings.snapshot_path(), settings.grid, settings.seating)
        .unwrap()
        .unwrap();
    assert_eq!(&restored, store.state());
    assert_eq!(restored.ledger().remaining_peremptory(Party::Plaintiff), 2);
    assert_eq!(restored.layout().start_corner(), StartCorner::TopRight);
}

#[test]
fn interrupted_write_recovers_from_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workspace.json");
    let mut store = default_store();
    store
        .dispatch(Action::SetStaffNotes("Panel leans young".to_string()))
        .unwrap();
    persistence::save(store.state(), &path).unwrap();

    // Crash after the old file was moved aside, before the new one landed.
    fs::rename(&path, path.with_extension("bak")).unwrap();

    let restored = persistence::load(&path, GridLayout::default(), store.state().seating())
        .unwrap()
        .unwrap();
    assert_eq!(restored.staff_notes(), "Panel leans young");
    assert!(path.exists());
}

#[test]
fn corrupt_snapshot_is_an_error_not_a_reset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workspace.json");
    fs::write(&path, "{ not json").unwrap();
    let err = persistence::load(
        &path,
        GridLayout::default(),
        venire_types::SeatingLimits::default(),
    )
    .unwrap_err();
    assert!(matches!(err, venire_core::SnapshotError::Parse { .. }));
}
