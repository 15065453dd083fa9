//! A single sheet: cells, merges, and what changed since loading

use std::collections::BTreeSet;

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// One sheet of a workbook
///
/// Every write is recorded in an edit set until [`Worksheet::clear_edits`],
/// which lets the package writer patch exactly those cells and nothing else.
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
    edited: BTreeSet<(u32, u16)>,
    /// Largest (row, col) of any `<c>` in the source part, value or not
    extent: Option<(u32, u16)>,
}

impl Worksheet {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            edited: BTreeSet::new(),
            extent: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored cell at a 0-based position
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Value at an A1 reference, mostly for tests and tooling
    pub fn get_value(&self, reference: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(reference)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.value_ref_at(row, col).clone()
    }

    /// Borrowed value, [`CellValue::Empty`] where nothing is stored
    pub fn value_ref_at(&self, row: u32, col: u16) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.cells.get(row, col).map_or(EMPTY, |c| &c.value)
    }

    pub fn cell_style_index_at(&self, row: u32, col: u16) -> u32 {
        self.cells.get(row, col).map_or(0, |c| c.style_index)
    }

    pub fn set_cell_value<V: Into<CellValue>>(&mut self, reference: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(reference)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Write a value and mark the cell edited; the cell's style is untouched
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        check_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        self.edited.insert((row, col));
        Ok(())
    }

    pub fn clear_cell_value_at(&mut self, row: u32, col: u16) -> Result<()> {
        self.set_cell_value_at(row, col, CellValue::Empty)
    }

    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style_index: u32) -> Result<()> {
        check_position(row, col)?;
        self.cells.set_style(row, col, style_index);
        self.edited.insert((row, col));
        Ok(())
    }

    /// Edited positions in row-major order
    pub fn edited_cells(&self) -> impl Iterator<Item = (u32, u16)> + '_ {
        self.edited.iter().copied()
    }

    pub fn has_edits(&self) -> bool {
        !self.edited.is_empty()
    }

    pub fn clear_edits(&mut self) {
        self.edited.clear();
    }

    /// Record a cell present in the source part even if it holds nothing
    pub fn note_extent(&mut self, row: u32, col: u16) {
        self.extent = Some(match self.extent {
            Some((r, c)) => (r.max(row), c.max(col)),
            None => (row, col),
        });
    }

    /// Last row holding any cell, 0 for an empty sheet
    pub fn last_row(&self) -> u32 {
        self.extent_with_storage().map_or(0, |(row, _)| row)
    }

    /// Last column holding any cell, 0 for an empty sheet
    pub fn last_col(&self) -> u16 {
        self.extent_with_storage().map_or(0, |(_, col)| col)
    }

    fn extent_with_storage(&self) -> Option<(u32, u16)> {
        match (self.cells.max_position(), self.extent) {
            (Some((r1, c1)), Some((r2, c2))) => Some((r1.max(r2), c1.max(c2))),
            (stored, noted) => stored.or(noted),
        }
    }

    pub fn merged_regions(&self) -> &[CellRange] {
        self.cells.merges()
    }

    /// Add a merge; a range touching an existing merge is refused
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        if self.cells.merges().iter().any(|m| m.overlaps(range)) {
            return Err(Error::MergedCellConflict(range.to_string()));
        }
        self.cells.add_merge(*range);
        Ok(())
    }

    pub fn merged_region_at(&self, row: u32, col: u16) -> Option<&CellRange> {
        self.cells.merge_at(row, col)
    }
}

fn check_position(row: u32, col: u16) -> Result<()> {
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }
    if col >= MAX_COLS {
        return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
    }
    Ok(())
}
