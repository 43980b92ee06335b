//! Worksheet model.
//!
//! A [`Worksheet`] holds cells in one of two interchangeable stores: sparse
//! (an ordered map keyed by coordinate, for wide scattered data) or dense
//! (row-major jagged rows, for iteration-heavy workloads). Conversions
//! between the two are total. Sheet-level metadata (used range, column and
//! row info, merges, autofilter, margins) lives beside the store.

use std::collections::BTreeMap;

use crate::cell::Cell;
use crate::error::Result;
use crate::utils::cell_ref::{decode_cell_ref, CellRef, Range};

/// Per-column info, 0-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColInfo {
    pub width: Option<f64>,
    pub hidden: bool,
    pub custom_width: bool,
}

/// Per-row info, keyed by 0-based row index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowInfo {
    pub height: Option<f64>,
    pub hidden: bool,
}

/// Page margins, six values in inches.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetMargins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub header: f64,
    pub footer: f64,
}

impl Default for SheetMargins {
    fn default() -> Self {
        Self {
            left: 0.7,
            right: 0.7,
            top: 0.75,
            bottom: 0.75,
            header: 0.3,
            footer: 0.3,
        }
    }
}

/// Cell storage: sparse map keyed by `(row, col)` or dense row-major rows.
#[derive(Debug, Clone, PartialEq)]
pub enum CellStore {
    Sparse(BTreeMap<(u32, u32), Cell>),
    Dense(Vec<Vec<Option<Cell>>>),
}

/// A single worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    store: CellStore,
    /// The used range (`!ref` analogue). `None` for an empty sheet.
    pub dimension: Option<Range>,
    /// The original used range when a row limit clamped `dimension`.
    pub full_dimension: Option<Range>,
    /// Column info by 0-based index.
    pub cols: Vec<Option<ColInfo>>,
    /// Row info by 0-based index.
    pub rows: BTreeMap<u32, RowInfo>,
    /// Merged ranges.
    pub merges: Vec<Range>,
    /// AutoFilter range.
    pub autofilter: Option<Range>,
    /// Page margins.
    pub margins: Option<SheetMargins>,
}

impl Worksheet {
    /// A new, empty sparse worksheet.
    pub fn new() -> Self {
        Self {
            store: CellStore::Sparse(BTreeMap::new()),
            dimension: None,
            full_dimension: None,
            cols: Vec::new(),
            rows: BTreeMap::new(),
            merges: Vec::new(),
            autofilter: None,
            margins: None,
        }
    }

    /// A new, empty dense worksheet.
    pub fn new_dense() -> Self {
        Self {
            store: CellStore::Dense(Vec::new()),
            ..Self::new()
        }
    }

    pub fn is_dense(&self) -> bool {
        matches!(self.store, CellStore::Dense(_))
    }

    /// Number of stored cells (including stubs).
    pub fn cell_count(&self) -> usize {
        match &self.store {
            CellStore::Sparse(map) => map.len(),
            CellStore::Dense(rows) => rows
                .iter()
                .map(|r| r.iter().filter(|c| c.is_some()).count())
                .sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }

    /// Look up a cell by coordinate.
    pub fn get(&self, at: CellRef) -> Option<&Cell> {
        match &self.store {
            CellStore::Sparse(map) => map.get(&(at.row, at.col)),
            CellStore::Dense(rows) => rows
                .get(at.row as usize)
                .and_then(|r| r.get(at.col as usize))
                .and_then(|c| c.as_ref()),
        }
    }

    /// Mutable lookup by coordinate.
    pub fn get_mut(&mut self, at: CellRef) -> Option<&mut Cell> {
        match &mut self.store {
            CellStore::Sparse(map) => map.get_mut(&(at.row, at.col)),
            CellStore::Dense(rows) => rows
                .get_mut(at.row as usize)
                .and_then(|r| r.get_mut(at.col as usize))
                .and_then(|c| c.as_mut()),
        }
    }

    /// Insert a cell, expanding the used range to cover it.
    pub fn insert(&mut self, at: CellRef, cell: Cell) {
        match &mut self.store {
            CellStore::Sparse(map) => {
                map.insert((at.row, at.col), cell);
            }
            CellStore::Dense(rows) => {
                let row_idx = at.row as usize;
                if rows.len() <= row_idx {
                    rows.resize_with(row_idx + 1, Vec::new);
                }
                let row = &mut rows[row_idx];
                let col_idx = at.col as usize;
                if row.len() <= col_idx {
                    row.resize_with(col_idx + 1, || None);
                }
                row[col_idx] = Some(cell);
            }
        }
        self.expand_dimension(at);
    }

    /// Look up a cell by A1 reference.
    pub fn cell(&self, a1: &str) -> Result<Option<&Cell>> {
        Ok(self.get(decode_cell_ref(a1)?))
    }

    /// Mutable lookup by A1 reference, creating a stub when absent.
    pub fn cell_entry(&mut self, a1: &str) -> Result<&mut Cell> {
        let at = decode_cell_ref(a1)?;
        if self.get(at).is_none() {
            self.insert(at, Cell::stub());
        }
        self.get_mut(at)
            .ok_or_else(|| crate::error::Error::Internal("cell entry vanished".to_string()))
    }

    /// Insert a cell by A1 reference.
    pub fn set_cell(&mut self, a1: &str, cell: Cell) -> Result<()> {
        let at = decode_cell_ref(a1)?;
        self.insert(at, cell);
        Ok(())
    }

    /// Grow `dimension` so it covers `at`.
    pub fn expand_dimension(&mut self, at: CellRef) {
        match &mut self.dimension {
            Some(range) => range.expand_to(at),
            None => self.dimension = Some(Range::single(at)),
        }
    }

    /// Iterate cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        let items: Vec<(CellRef, &Cell)> = match &self.store {
            CellStore::Sparse(map) => map
                .iter()
                .map(|(&(row, col), cell)| (CellRef { col, row }, cell))
                .collect(),
            CellStore::Dense(rows) => rows
                .iter()
                .enumerate()
                .flat_map(|(r, row)| {
                    row.iter().enumerate().filter_map(move |(c, cell)| {
                        cell.as_ref()
                            .map(|cell| (CellRef::new(c as u32, r as u32), cell))
                    })
                })
                .collect(),
        };
        items.into_iter()
    }

    /// Convert the store to the dense form (no-op when already dense).
    pub fn to_dense(&mut self) {
        if self.is_dense() {
            return;
        }
        let CellStore::Sparse(map) = std::mem::replace(&mut self.store, CellStore::Dense(vec![]))
        else {
            return;
        };
        let mut rows: Vec<Vec<Option<Cell>>> = Vec::new();
        for ((row, col), cell) in map {
            let row_idx = row as usize;
            if rows.len() <= row_idx {
                rows.resize_with(row_idx + 1, Vec::new);
            }
            let r = &mut rows[row_idx];
            let col_idx = col as usize;
            if r.len() <= col_idx {
                r.resize_with(col_idx + 1, || None);
            }
            r[col_idx] = Some(cell);
        }
        self.store = CellStore::Dense(rows);
    }

    /// Convert the store to the sparse form (no-op when already sparse).
    pub fn to_sparse(&mut self) {
        if !self.is_dense() {
            return;
        }
        let CellStore::Dense(rows) =
            std::mem::replace(&mut self.store, CellStore::Sparse(BTreeMap::new()))
        else {
            return;
        };
        let mut map = BTreeMap::new();
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                if let Some(cell) = cell {
                    map.insert((r as u32, c as u32), cell);
                }
            }
        }
        self.store = CellStore::Sparse(map);
    }

    /// Ensure the column-info vector reaches `col`, returning its slot.
    pub fn col_info_mut(&mut self, col: u32) -> &mut ColInfo {
        let idx = col as usize;
        if self.cols.len() <= idx {
            self.cols.resize_with(idx + 1, || None);
        }
        self.cols[idx].get_or_insert_with(ColInfo::default)
    }
}

impl Default for Worksheet {
    fn default() -> Self {
        Self::new()
    }
}
