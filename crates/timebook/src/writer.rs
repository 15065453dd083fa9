//! Writing bookings into month sheets

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use thiserror::Error;
use timebook_core::{CellValue, Workbook};
use tracing::{debug, info, warn};

use crate::dates::find_row_for_date;
use crate::error::Result;
use crate::guard::WorkbookGuard;
use crate::layout::{resolve_employee_block, resolve_project_column};
use crate::router::{month_sheet, resolve_sheet_mut};
use crate::schema::set_value_at;

/// What to book on a day
#[derive(Debug, Clone, PartialEq)]
pub enum Booking {
    /// Hours on a project; all absence text of the day is removed
    Project { project: String, hours: f64 },
    /// An absence type; all project hours of the day are removed
    Absence { kind: String },
}

impl Booking {
    /// Book `hours` on `project`
    pub fn project<S: Into<String>>(project: S, hours: f64) -> Self {
        Booking::Project {
            project: project.into(),
            hours,
        }
    }

    /// Book an absence of type `kind`
    pub fn absence<S: Into<String>>(kind: S) -> Self {
        Booking::Absence { kind: kind.into() }
    }
}

impl fmt::Display for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Booking::Project { project, hours } => write!(f, "{} h {}", hours, project.trim()),
            Booking::Absence { kind } => write!(f, "{}", kind.trim()),
        }
    }
}

/// Why a single day could not be written
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DayFailure {
    #[error("month sheet '{0}' not found")]
    MissingMonthSheet(&'static str),

    #[error("no row for this date on the month sheet")]
    MissingDateRow,

    #[error("employee not found in the header row")]
    UnknownEmployee,

    #[error("project not found in the employee's subheader")]
    UnknownProject,

    #[error("cell rejected: {0}")]
    CellRejected(String),
}

/// Outcome of writing a date range
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteSummary {
    /// Days written
    pub ok: usize,
    /// Weekdays that could not be written
    pub failed: usize,
    /// The failed days and why, in date order
    pub failures: Vec<(NaiveDate, DayFailure)>,
}

impl WriteSummary {
    fn record(&mut self, date: NaiveDate, outcome: std::result::Result<(), DayFailure>) {
        match outcome {
            Ok(()) => self.ok += 1,
            Err(failure) => {
                self.failed += 1;
                self.failures.push((date, failure));
            }
        }
    }

    /// Check whether no day at all was written
    pub fn nothing_written(&self) -> bool {
        self.ok == 0
    }

    /// Check whether some days were written and others failed
    pub fn is_partial(&self) -> bool {
        self.ok > 0 && self.failed > 0
    }

    /// Number of weekdays attempted
    pub fn attempted(&self) -> usize {
        self.ok + self.failed
    }
}

/// Check whether `date` falls on Monday through Friday
pub fn is_workday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Write one booking for `employee` on `date`.
///
/// An absence goes into the block's absence column and clears every
/// project column of that day. Project hours go into the project's column
/// and clear the absence column; other project columns are left alone.
/// Hours are not validated here.
pub fn write_one_day(
    workbook: &mut Workbook,
    date: NaiveDate,
    employee: &str,
    booking: &Booking,
) -> std::result::Result<(), DayFailure> {
    let sheet = resolve_sheet_mut(workbook, date)
        .ok_or(DayFailure::MissingMonthSheet(month_sheet(date)))?;
    let row = find_row_for_date(sheet, date).ok_or(DayFailure::MissingDateRow)?;
    let block = resolve_employee_block(sheet, employee).ok_or(DayFailure::UnknownEmployee)?;
    let absence_col = block.absence_column();

    let reject = |e: timebook_core::Error| DayFailure::CellRejected(e.to_string());

    match booking {
        Booking::Absence { kind } => {
            set_value_at(sheet, row, absence_col, kind.trim()).map_err(reject)?;
            for col in block.project_columns() {
                set_value_at(sheet, row, col, CellValue::Empty).map_err(reject)?;
            }
            debug!(%date, employee, row, col = absence_col, "absence written");
        }
        Booking::Project { project, hours } => {
            let col =
                resolve_project_column(sheet, &block, project).ok_or(DayFailure::UnknownProject)?;
            set_value_at(sheet, row, col, *hours).map_err(reject)?;
            set_value_at(sheet, row, absence_col, CellValue::Empty).map_err(reject)?;
            debug!(%date, employee, row, col, hours, "hours written");
        }
    }

    Ok(())
}

/// Write `booking` on every weekday from `date_from` to `date_to`.
///
/// Inverted bounds are swapped. The workbook is opened once and saved once
/// after the whole range, so days that did get written are kept even when
/// others fail.
pub fn write_range(
    guard: &WorkbookGuard,
    employee: &str,
    booking: &Booking,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> Result<WriteSummary> {
    let (from, to) = if date_to < date_from {
        (date_to, date_from)
    } else {
        (date_from, date_to)
    };
    let employee = employee.trim();

    let mut doc = guard.open()?;
    let mut summary = WriteSummary::default();

    for date in from.iter_days().take_while(|d| *d <= to) {
        if !is_workday(date) {
            continue;
        }
        let outcome = write_one_day(doc.workbook_mut(), date, employee, booking);
        if let Err(failure) = &outcome {
            warn!(%date, employee, "day not written: {}", failure);
        }
        summary.record(date, outcome);
    }

    guard.save(&mut doc)?;
    info!(
        employee,
        %from,
        %to,
        booking = %booking,
        ok = summary.ok,
        failed = summary.failed,
        "range written"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::value_at;
    use pretty_assertions::assert_eq;
    use timebook_core::CellRange;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Januar with Max in F..H (MOIA, DiE, absence) and dates from row 5
    fn workbook() -> Workbook {
        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet_with_name("Januar").unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();
        set_value_at(sheet, 3, 6, "Max").unwrap();
        sheet.merge_cells(&CellRange::parse("F3:H3").unwrap()).unwrap();
        set_value_at(sheet, 4, 6, "MOIA").unwrap();
        set_value_at(sheet, 4, 7, "DiE").unwrap();
        set_value_at(sheet, 4, 8, "Abwesenheit").unwrap();
        for day in 1..=31 {
            set_value_at(sheet, 4 + day, 3, ymd(2025, 1, day)).unwrap();
        }
        wb.clear_edits();
        wb
    }

    fn day_cells(wb: &Workbook, row: u32) -> Vec<CellValue> {
        let sheet = wb.worksheet_by_name("Januar").unwrap();
        (6..=8).map(|c| value_at(sheet, row, c).clone()).collect()
    }

    #[test]
    fn test_project_hours() {
        let mut wb = workbook();
        write_one_day(&mut wb, ymd(2025, 1, 6), "max", &Booking::project("moia", 3.5)).unwrap();

        // 2025-01-06 is in row 10
        assert_eq!(
            day_cells(&wb, 10),
            vec![CellValue::Number(3.5), CellValue::Empty, CellValue::Empty]
        );
    }

    #[test]
    fn test_absence_clears_projects_and_back() {
        let mut wb = workbook();
        let date = ymd(2025, 1, 6);

        write_one_day(&mut wb, date, "Max", &Booking::project("MOIA", 3.5)).unwrap();
        write_one_day(&mut wb, date, "Max", &Booking::project("DiE", 3.5)).unwrap();
        assert_eq!(
            day_cells(&wb, 10),
            vec![
                CellValue::Number(3.5),
                CellValue::Number(3.5),
                CellValue::Empty
            ]
        );

        write_one_day(&mut wb, date, "Max", &Booking::absence(" Urlaub ")).unwrap();
        assert_eq!(
            day_cells(&wb, 10),
            vec![
                CellValue::Empty,
                CellValue::Empty,
                CellValue::string("Urlaub")
            ]
        );

        write_one_day(&mut wb, date, "Max", &Booking::project("DiE", 7.0)).unwrap();
        assert_eq!(
            day_cells(&wb, 10),
            vec![CellValue::Empty, CellValue::Number(7.0), CellValue::Empty]
        );
    }

    #[test]
    fn test_failure_reasons() {
        let mut wb = workbook();

        assert_eq!(
            write_one_day(&mut wb, ymd(2025, 2, 3), "Max", &Booking::absence("Urlaub")),
            Err(DayFailure::MissingMonthSheet("Februar"))
        );
        assert_eq!(
            write_one_day(&mut wb, ymd(2024, 1, 8), "Max", &Booking::absence("Urlaub")),
            Err(DayFailure::MissingDateRow)
        );
        assert_eq!(
            write_one_day(&mut wb, ymd(2025, 1, 6), "Erika", &Booking::absence("Urlaub")),
            Err(DayFailure::UnknownEmployee)
        );
        assert_eq!(
            write_one_day(&mut wb, ymd(2025, 1, 6), "Max", &Booking::project("Abwesenheit", 7.0)),
            Err(DayFailure::UnknownProject)
        );
        assert!(!wb.has_edits());
    }

    #[test]
    fn test_hours_are_not_validated() {
        let mut wb = workbook();
        write_one_day(&mut wb, ymd(2025, 1, 7), "Max", &Booking::project("MOIA", 1.25)).unwrap();
        assert_eq!(day_cells(&wb, 11)[0], CellValue::Number(1.25));
    }

    #[test]
    fn test_summary_flags() {
        let mut summary = WriteSummary::default();
        assert!(summary.nothing_written());
        assert!(!summary.is_partial());

        summary.record(ymd(2025, 1, 6), Ok(()));
        summary.record(ymd(2025, 1, 7), Err(DayFailure::MissingDateRow));
        assert!(!summary.nothing_written());
        assert!(summary.is_partial());
        assert_eq!(summary.attempted(), 2);
        assert_eq!(
            summary.failures,
            vec![(ymd(2025, 1, 7), DayFailure::MissingDateRow)]
        );
    }

    #[test]
    fn test_workdays() {
        assert!(is_workday(ymd(2025, 1, 6)));
        assert!(is_workday(ymd(2025, 1, 10)));
        assert!(!is_workday(ymd(2025, 1, 11)));
        assert!(!is_workday(ymd(2025, 1, 12)));
    }
}
