//! Seat grid geometry.
//!
//! A juror id (1-based) has a *logical* seat in raster order:
//! `col = (id-1) mod columns`, `row = (id-1) div columns`. The configured
//! [`StartCorner`] decides which physical corner holds logical seat zero.
//! Physical cells are indexed row-major from the top-left.
//!
//! Every corner transform only mirrors rows and/or columns, so each one is its
//! own inverse. [`GridLayout::id_at`] relies on that.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::JurorId;

pub const MIN_GRID_DIMENSION: u32 = 3;
pub const MAX_GRID_DIMENSION: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error(
        "{axis} must be between {min} and {max} (got {value})",
        min = MIN_GRID_DIMENSION,
        max = MAX_GRID_DIMENSION
    )]
    DimensionOutOfRange { axis: &'static str, value: u32 },
}

/// Which physical corner holds juror #1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartCorner {
    TopLeft,
    TopRight,
    /// Courtroom default: numbering starts nearest the bench.
    #[default]
    BottomLeft,
    BottomRight,
}

impl StartCorner {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StartCorner::TopLeft => "top-left",
            StartCorner::TopRight => "top-right",
            StartCorner::BottomLeft => "bottom-left",
            StartCorner::BottomRight => "bottom-right",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "top-left" | "tl" => Some(StartCorner::TopLeft),
            "top-right" | "tr" => Some(StartCorner::TopRight),
            "bottom-left" | "bl" => Some(StartCorner::BottomLeft),
            "bottom-right" | "br" => Some(StartCorner::BottomRight),
            _ => None,
        }
    }

    #[must_use]
    pub const fn all() -> &'static [StartCorner] {
        &[
            StartCorner::TopLeft,
            StartCorner::TopRight,
            StartCorner::BottomLeft,
            StartCorner::BottomRight,
        ]
    }

    /// Physical cell index for a logical seat.
    #[must_use]
    pub fn place(self, seat: LogicalSeat, columns: usize, rows: usize) -> usize {
        match self {
            StartCorner::TopLeft => top_left(seat, columns),
            StartCorner::TopRight => top_right(seat, columns),
            StartCorner::BottomLeft => bottom_left(seat, columns, rows),
            StartCorner::BottomRight => bottom_right(seat, columns, rows),
        }
    }
}

fn top_left(seat: LogicalSeat, columns: usize) -> usize {
    seat.row * columns + seat.col
}

fn top_right(seat: LogicalSeat, columns: usize) -> usize {
    seat.row * columns + (columns - 1 - seat.col)
}

fn bottom_left(seat: LogicalSeat, columns: usize, rows: usize) -> usize {
    (rows - 1 - seat.row) * columns + seat.col
}

fn bottom_right(seat: LogicalSeat, columns: usize, rows: usize) -> usize {
    (rows - 1 - seat.row) * columns + (columns - 1 - seat.col)
}

/// Row/column in raster order, before the corner transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalSeat {
    pub row: usize,
    pub col: usize,
}

#[derive(Deserialize)]
struct RawGridLayout {
    columns: u32,
    rows: u32,
    #[serde(default)]
    start_corner: StartCorner,
}

/// Validated grid dimensions plus numbering convention.
///
/// Invariant: `columns` and `rows` are within
/// `MIN_GRID_DIMENSION..=MAX_GRID_DIMENSION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGridLayout")]
pub struct GridLayout {
    columns: u32,
    rows: u32,
    start_corner: StartCorner,
}

impl TryFrom<RawGridLayout> for GridLayout {
    type Error = GridError;

    fn try_from(raw: RawGridLayout) -> Result<Self, Self::Error> {
        Self::new(raw.columns, raw.rows, raw.start_corner)
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 7,
            rows: 5,
            start_corner: StartCorner::BottomLeft,
        }
    }
}

impl GridLayout {
    pub fn new(columns: u32, rows: u32, start_corner: StartCorner) -> Result<Self, GridError> {
        check_dimension("columns", columns)?;
        check_dimension("rows", rows)?;
        Ok(Self {
            columns,
            rows,
            start_corner,
        })
    }

    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    #[must_use]
    pub const fn start_corner(&self) -> StartCorner {
        self.start_corner
    }

    #[must_use]
    pub const fn with_start_corner(mut self, start_corner: StartCorner) -> Self {
        self.start_corner = start_corner;
        self
    }

    pub fn with_dimensions(self, columns: u32, rows: u32) -> Result<Self, GridError> {
        Self::new(columns, rows, self.start_corner)
    }

    #[must_use]
    pub const fn total_seats(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    /// Highest id that has a seat on this grid.
    #[must_use]
    pub const fn max_id(&self) -> JurorId {
        JurorId::from_ordinal(self.columns * self.rows - 1)
    }

    #[must_use]
    pub const fn contains(&self, id: JurorId) -> bool {
        id.ordinal() < self.total_seats()
    }

    /// Logical seat for `id`, or `None` if the id is beyond the grid.
    #[must_use]
    pub fn logical_seat(&self, id: JurorId) -> Option<LogicalSeat> {
        let ordinal = id.ordinal();
        if ordinal >= self.total_seats() {
            return None;
        }
        let columns = self.columns as usize;
        Some(LogicalSeat {
            row: ordinal / columns,
            col: ordinal % columns,
        })
    }

    /// Physical cell (row-major, top-left = 0) that renders `id`.
    #[must_use]
    pub fn cell_index(&self, id: JurorId) -> Option<usize> {
        let seat = self.logical_seat(id)?;
        Some(
            self.start_corner
                .place(seat, self.columns as usize, self.rows as usize),
        )
    }

    /// Inverse of [`GridLayout::cell_index`].
    #[must_use]
    pub fn id_at(&self, cell: usize) -> Option<JurorId> {
        if cell >= self.total_seats() {
            return None;
        }
        let columns = self.columns as usize;
        let physical = LogicalSeat {
            row: cell / columns,
            col: cell % columns,
        };
        let ordinal = self
            .start_corner
            .place(physical, columns, self.rows as usize);
        Some(JurorId::from_ordinal(ordinal as u32))
    }
}

fn check_dimension(axis: &'static str, value: u32) -> Result<(), GridError> {
    if (MIN_GRID_DIMENSION..=MAX_GRID_DIMENSION).contains(&value) {
        Ok(())
    } else {
        Err(GridError::DimensionOutOfRange { axis, value })
    }
}
