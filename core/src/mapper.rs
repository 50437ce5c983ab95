//! Juror id to physical seat mapping.
//!
//! The geometry lives on [`GridLayout`]; this module projects a whole
//! workspace onto it. Vacant ids, deleted jurors and ids beyond the grid all
//! render as empty cells.

use venire_types::{GridLayout, JurorId, JurorRecord};

use crate::JuryState;

/// One rendered grid: `cells[i]` is the juror at physical cell `i`
/// (row-major, top-left = 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatGrid {
    layout: GridLayout,
    cells: Vec<Option<JurorId>>,
}

impl SeatGrid {
    #[must_use]
    pub fn layout_for(state: &JuryState) -> Self {
        Self::from_records(state.jurors(), *state.layout())
    }

    #[must_use]
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a JurorRecord>,
        layout: GridLayout,
    ) -> Self {
        let mut cells = vec![None; layout.total_seats()];
        for record in records {
            if record.deleted {
                continue;
            }
            if let Some(cell) = layout.cell_index(record.id) {
                cells[cell] = Some(record.id);
            }
        }
        Self { layout, cells }
    }

    #[must_use]
    pub const fn layout(&self) -> &GridLayout {
        &self.layout
    }

    #[must_use]
    pub fn juror_at(&self, cell: usize) -> Option<JurorId> {
        self.cells.get(cell).copied().flatten()
    }

    /// Which id a cell stands for, whether or not a juror currently holds it.
    #[must_use]
    pub fn id_at(&self, cell: usize) -> Option<JurorId> {
        self.layout.id_at(cell)
    }

    #[must_use]
    pub fn cells(&self) -> &[Option<JurorId>] {
        &self.cells
    }

    /// Physical rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<JurorId>]> {
        self.cells.chunks(self.layout.columns() as usize)
    }
}
