//! A1 references and rectangular ranges
//!
//! Everything here is 0-based. The workbook parts use A1 text (`r="F10"`,
//! `<mergeCell ref="F3:H3"/>`), so parsing and formatting live next to the
//! types.

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;

/// One cell position, `row` and `col` counted from 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

impl CellAddress {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse an A1 reference such as `C5` or `$F$3`
    ///
    /// Absolute markers are dropped; merge refs in older files carry them.
    ///
    /// ```
    /// use timebook_core::CellAddress;
    ///
    /// assert_eq!(CellAddress::parse("C5").unwrap(), CellAddress::new(4, 2));
    /// assert_eq!(CellAddress::parse("$F$3").unwrap(), CellAddress::new(2, 5));
    /// ```
    pub fn parse(reference: &str) -> Result<Self> {
        let cleaned: String = reference.trim().chars().filter(|c| *c != '$').collect();
        let split = cleaned
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(cleaned.len());
        let (letters, digits) = cleaned.split_at(split);

        if letters.is_empty() || digits.is_empty() {
            return Err(Error::InvalidAddress(format!(
                "'{}' is not an A1 reference",
                reference
            )));
        }
        let col = Self::letters_to_column(letters)?;

        let row_number: u32 = digits
            .parse()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| Error::InvalidAddress(format!("bad row in '{}'", reference)))?;
        if row_number > MAX_ROWS {
            return Err(Error::RowOutOfBounds(row_number - 1, MAX_ROWS - 1));
        }

        Ok(Self::new(row_number - 1, col))
    }

    /// Column letters for a 0-based index (5 -> `F`, 26 -> `AA`)
    pub fn column_to_letters(col: u16) -> String {
        let mut letters = Vec::new();
        let mut rest = u32::from(col) + 1;
        while rest > 0 {
            let digit = (rest - 1) % 26;
            letters.push(b'A' + digit as u8);
            rest = (rest - 1) / 26;
        }
        letters.reverse();
        String::from_utf8_lossy(&letters).into_owned()
    }

    /// 0-based index for column letters, case-insensitive
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        let number = letters.bytes().try_fold(0u32, |acc, b| {
            if !b.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "'{}' is not a column",
                    letters
                )));
            }
            let next = acc * 26 + u32::from(b.to_ascii_uppercase() - b'A') + 1;
            if next > u32::from(MAX_COLS) {
                return Err(Error::ColumnOutOfBounds(MAX_COLS, MAX_COLS - 1));
            }
            Ok(next)
        })?;

        match number {
            0 => Err(Error::InvalidAddress("empty column".into())),
            n => Ok((n - 1) as u16),
        }
    }

    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

/// Inclusive rectangle, always stored top-left to bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Parse `F3:H3`; a lone reference gives a one-cell range
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        let (first, second) = reference.split_once(':').unwrap_or((reference, reference));
        let corner = |part: &str| {
            CellAddress::parse(part)
                .map_err(|e| Error::InvalidRange(format!("{}: {}", reference, e)))
        };
        Ok(Self::new(corner(first)?, corner(second)?))
    }

    pub fn contains(&self, row: u32, col: u16) -> bool {
        (self.start.row..=self.end.row).contains(&row)
            && (self.start.col..=self.end.col).contains(&col)
    }

    /// Number of columns covered; an employee header merge spans its block
    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    pub fn overlaps(&self, other: &CellRange) -> bool {
        !(other.end.row < self.start.row
            || other.start.row > self.end.row
            || other.end.col < self.start.col
            || other.start.col > self.end.col)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters_both_ways() {
        for (index, letters) in [(0, "A"), (5, "F"), (15, "P"), (25, "Z"), (26, "AA"), (701, "ZZ"), (16383, "XFD")] {
            assert_eq!(CellAddress::column_to_letters(index), letters);
            assert_eq!(CellAddress::letters_to_column(letters).unwrap(), index);
        }
        assert_eq!(CellAddress::letters_to_column("ac").unwrap(), 28);
        assert!(CellAddress::letters_to_column("XFE").is_err());
        assert!(CellAddress::letters_to_column("").is_err());
    }

    #[test]
    fn test_parses_sheet_references() {
        assert_eq!(CellAddress::parse("C5").unwrap(), CellAddress::new(4, 2));
        assert_eq!(CellAddress::parse("$M$4").unwrap(), CellAddress::new(3, 12));
        assert_eq!(
            CellAddress::parse("XFD1048576").unwrap(),
            CellAddress::new(1_048_575, 16_383)
        );
        assert_eq!(CellAddress::new(9, 5).to_string(), "F10");
    }

    #[test]
    fn test_rejects_broken_references() {
        for bad in ["", "A", "1", "A0", "A1048577", "F3x"] {
            assert!(CellAddress::parse(bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_header_merge_range() {
        let range = CellRange::parse("H3:F3").unwrap();
        assert_eq!(range.start, CellAddress::new(2, 5));
        assert_eq!(range.end, CellAddress::new(2, 7));
        assert_eq!(range.col_count(), 3);
        assert_eq!(range.to_string(), "F3:H3");
        assert!(range.contains(2, 6));
        assert!(!range.contains(3, 6));

        assert!(range.overlaps(&CellRange::parse("H3:I3").unwrap()));
        assert!(!range.overlaps(&CellRange::parse("I3:J3").unwrap()));
        assert_eq!(CellRange::parse("C5").unwrap().to_string(), "C5");
    }
}
