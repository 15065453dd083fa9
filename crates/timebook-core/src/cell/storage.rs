//! Sparse cell storage
//!
//! A month sheet is mostly empty grid with a styled frame, so only cells that
//! carry a value or a non-default style are stored.

use std::collections::BTreeMap;

use super::{CellRange, CellValue};

/// Value plus style of one stored cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellData {
    pub value: CellValue,
    /// Index into the workbook's `cellXfs` table, 0 is the default style
    pub style_index: u32,
}

impl CellData {
    pub fn new(value: CellValue) -> Self {
        Self::with_style(value, 0)
    }

    pub fn with_style(value: CellValue, style_index: u32) -> Self {
        Self { value, style_index }
    }

    /// Nothing worth keeping: no value and the default style
    pub fn is_vacant(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }
}

/// Cells keyed by row, then column; iteration is row-major
#[derive(Debug, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, BTreeMap<u16, CellData>>,
    merges: Vec<CellRange>,
}

impl CellStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row)?.get(&col)
    }

    /// Store `data`, dropping the cell (and an emptied row) when it is vacant
    pub fn put(&mut self, row: u32, col: u16, data: CellData) {
        if !data.is_vacant() {
            self.rows.entry(row).or_default().insert(col, data);
            return;
        }
        if let Some(cells) = self.rows.get_mut(&row) {
            cells.remove(&col);
            if cells.is_empty() {
                self.rows.remove(&row);
            }
        }
    }

    /// Replace the value, the style index stays
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let style_index = self.get(row, col).map_or(0, |c| c.style_index);
        self.put(row, col, CellData::with_style(value, style_index));
    }

    /// Replace the style index, the value stays
    pub fn set_style(&mut self, row: u32, col: u16, style_index: u32) {
        let value = self.get(row, col).map(|c| c.value.clone()).unwrap_or_default();
        self.put(row, col, CellData::with_style(value, style_index));
    }

    /// Largest stored row and column, style-only cells included
    pub fn max_position(&self) -> Option<(u32, u16)> {
        let last_row = *self.rows.keys().next_back()?;
        let last_col = self
            .rows
            .values()
            .filter_map(|cells| cells.keys().next_back().copied())
            .max()?;
        Some((last_row, last_col))
    }

    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }

    pub fn add_merge(&mut self, range: CellRange) {
        self.merges.push(range);
    }

    /// First merge covering the cell, in document order
    pub fn merge_at(&self, row: u32, col: u16) -> Option<&CellRange> {
        self.merges.iter().find(|r| r.contains(row, col))
    }
}
