//! Core domain logic for Venire.
//!
//! The workspace is a single immutable [`JuryState`]: one aggregate
//! [`JurorRecord`](venire_types::JurorRecord) per juror plus the
//! [`StrikeLedger`] cache over their strikes. Mutations go through
//! [`JuryState::reduce`] and are committed by [`JuryStore`].

mod errors;
mod export;
mod ledger;
mod mapper;
pub mod persistence;
mod roster;
mod script;
mod seating;
mod state;

pub use errors::JuryError;
pub use export::{ExportRow, export_rows, to_csv_string, write_csv};
pub use ledger::{PartyTally, StrikeLedger};
pub use mapper::SeatGrid;
pub use persistence::{SnapshotError, WorkspaceSnapshot};
pub use script::DEFAULT_SCRIPT;
pub use state::{Action, JuryState, JuryStore, Summary};
