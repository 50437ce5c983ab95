//! Workspace snapshot persistence.
//!
//! The snapshot holds the ledger, every juror record, staff notes, the voir
//! dire script and the current selection. Grid dimensions and seating limits
//! come from the config file and are supplied again on load.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use venire_types::{GridLayout, JurorId, JurorRecord, SeatingLimits};
use venire_utils::AtomicWriteOptions;

use crate::{JuryState, StrikeLedger};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write snapshot at {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("snapshot at {} is not valid: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(
        "snapshot version {found} is newer than supported version {supported}",
        supported = SNAPSHOT_VERSION
    )]
    UnsupportedVersion { found: u32 },
    #[error("snapshot lists juror {0} more than once")]
    DuplicateJuror(JurorId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    pub version: u32,
    pub ledger: StrikeLedger,
    pub jurors: Vec<JurorRecord>,
    #[serde(default)]
    pub staff_notes: String,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub selected: Option<JurorId>,
}

impl WorkspaceSnapshot {
    #[must_use]
    pub fn capture(state: &JuryState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            ledger: state.ledger,
            jurors: state.jurors.values().cloned().collect(),
            staff_notes: state.staff_notes.clone(),
            script: Some(state.script.clone()),
            selected: state.selected,
        }
    }

    /// Rebuild workspace state. Ledger counters are recounted from the
    /// records; a stored ledger that disagrees is logged and replaced.
    pub fn into_state(
        self,
        layout: GridLayout,
        seating: SeatingLimits,
    ) -> Result<JuryState, SnapshotError> {
        if self.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
            });
        }

        let mut jurors = std::collections::BTreeMap::new();
        for record in self.jurors {
            let id = record.id;
            if jurors.insert(id, record).is_some() {
                return Err(SnapshotError::DuplicateJuror(id));
            }
        }

        let beyond = jurors.keys().filter(|id| !layout.contains(**id)).count();
        if beyond > 0 {
            tracing::warn!(
                beyond,
                columns = layout.columns(),
                rows = layout.rows(),
                "Snapshot has jurors outside the configured grid; they stay hidden until it grows"
            );
        }

        let ledger = self.ledger.tally(jurors.values());
        if ledger != self.ledger {
            tracing::warn!(
                stored = ?self.ledger,
                recounted = ?ledger,
                "Stored strike ledger disagrees with juror records; using recount"
            );
        }

        let selected = self
            .selected
            .filter(|id| jurors.get(id).is_some_and(|record| !record.deleted));

        Ok(JuryState {
            jurors,
            ledger,
            layout,
            seating,
            staff_notes: self.staff_notes,
            script: self
                .script
                .unwrap_or_else(|| crate::script::DEFAULT_SCRIPT.to_string()),
            selected,
        })
    }
}

/// Write `state` to `path` as pretty JSON via an atomic replace.
pub fn save(state: &JuryState, path: &Path) -> Result<(), SnapshotError> {
    let snapshot = WorkspaceSnapshot::capture(state);
    let json = serde_json::to_string_pretty(&snapshot).map_err(|e| SnapshotError::Write {
        path: path.to_path_buf(),
        source: io::Error::other(e),
    })?;
    venire_utils::atomic_write_with_options(
        path,
        json.as_bytes(),
        AtomicWriteOptions {
            sync_all: true,
            dir_sync: true,
            unix_mode: Some(0o600),
        },
    )
    .map_err(|source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), jurors = snapshot.jurors.len(), "Saved workspace");
    Ok(())
}

/// Load a snapshot. `Ok(None)` means nothing has been saved yet.
pub fn load(
    path: &Path,
    layout: GridLayout,
    seating: SeatingLimits,
) -> Result<Option<JuryState>, SnapshotError> {
    let Some(json) = venire_utils::read_recovering(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?
    else {
        return Ok(None);
    };
    let snapshot: WorkspaceSnapshot =
        serde_json::from_str(&json).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    snapshot.into_state(layout, seating).map(Some)
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use venire_types::{MessageKind, Party, SeatRole, StartCorner, Strike};

    use super::*;
    use crate::Action;
    use crate::state::tests::{default_state, id};

    fn busy_state() -> JuryState {
        default_state()
            .reduce(Action::ApplyStrike {
                id: id(1),
                strike: Strike::peremptory(Party::Plaintiff),
            })
            .unwrap()
            .reduce(Action::ApplyStrike {
                id: id(2),
                strike: Strike::for_cause(Party::Defense),
            })
            .unwrap()
            .reduce(Action::PostMessage {
                id: id(3),
                sender: "Lead".to_string(),
                text: "Served on a jury before".to_string(),
                kind: MessageKind::Normal,
                at: SystemTime::UNIX_EPOCH,
            })
            .unwrap()
            .reduce(Action::Seat {
                id: id(4),
                role: SeatRole::Juror,
            })
            .unwrap()
            .reduce(Action::SetStaffNotes("Watch row two".to_string()))
            .unwrap()
            .reduce(Action::Select(id(3)))
            .unwrap()
            .delete_juror(id(9))
            .unwrap()
    }

    #[test]
    fn round_trip_reproduces_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        let state = busy_state();

        save(&state, &path).unwrap();
        let loaded = load(&path, *state.layout(), state.seating())
            .unwrap()
            .unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load(
            &dir.path().join("absent.json"),
            GridLayout::default(),
            SeatingLimits::default(),
        )
        .unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn mismatched_ledger_is_recounted() {
        let state = busy_state();
        let mut snapshot = WorkspaceSnapshot::capture(&state);
        snapshot.ledger = StrikeLedger::default();

        let restored = snapshot
            .into_state(*state.layout(), state.seating())
            .unwrap();
        assert_eq!(restored.ledger(), state.ledger());
        assert!(restored.ledger_is_reconciled());
    }

    #[test]
    fn duplicate_jurors_are_rejected() {
        let mut snapshot = WorkspaceSnapshot::capture(&default_state());
        let first = snapshot.jurors[0].clone();
        snapshot.jurors.push(first);
        assert!(matches!(
            snapshot.into_state(GridLayout::default(), SeatingLimits::default()),
            Err(SnapshotError::DuplicateJuror(_))
        ));
    }

    #[test]
    fn newer_version_is_rejected() {
        let mut snapshot = WorkspaceSnapshot::capture(&default_state());
        snapshot.version = SNAPSHOT_VERSION + 1;
        assert!(matches!(
            snapshot.into_state(GridLayout::default(), SeatingLimits::default()),
            Err(SnapshotError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn layout_comes_from_caller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        save(&default_state(), &path).unwrap();

        let layout = GridLayout::default().with_start_corner(StartCorner::TopLeft);
        let loaded = load(&path, layout, SeatingLimits::default())
            .unwrap()
            .unwrap();
        assert_eq!(loaded.layout().start_corner(), StartCorner::TopLeft);
    }

    #[test]
    fn invalid_strike_pair_fails_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        let mut json = serde_json::to_value(WorkspaceSnapshot::capture(&default_state())).unwrap();
        json["jurors"][0]["strike"] = serde_json::json!({ "type": "none", "party": "defense" });
        std::fs::write(&path, json.to_string()).unwrap();

        let err = load(&path, GridLayout::default(), SeatingLimits::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::Parse { .. }));
    }
}
