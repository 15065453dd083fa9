//! Month sheet routing and settings lists

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use timebook_core::{Workbook, Worksheet};

use crate::schema::{
    label_of, last_row, value_at, ABSENCE_LIST_COLUMN, EMPLOYEE_LIST_COLUMN, LIST_FIRST_ROW,
    PROJECT_LIST_COLUMN, SETTINGS_SHEET,
};

const MONTH_NAMES: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// Name of the month sheet holding `date`
pub fn month_sheet(date: NaiveDate) -> &'static str {
    MONTH_NAMES[date.month0() as usize]
}

/// Alternative spelling accepted for a month sheet name
fn alias(name: &str) -> Option<&'static str> {
    match name {
        "März" => Some("Maerz"),
        _ => None,
    }
}

fn sheet_index(workbook: &Workbook, date: NaiveDate) -> Option<usize> {
    let name = month_sheet(date);
    workbook
        .sheet_index(name)
        .or_else(|| alias(name).and_then(|a| workbook.sheet_index(a)))
}

/// The month sheet for `date`, if the workbook has one
pub fn resolve_sheet(workbook: &Workbook, date: NaiveDate) -> Option<&Worksheet> {
    sheet_index(workbook, date).and_then(|i| workbook.worksheet(i))
}

/// Mutable twin of [`resolve_sheet`]
pub fn resolve_sheet_mut(workbook: &mut Workbook, date: NaiveDate) -> Option<&mut Worksheet> {
    sheet_index(workbook, date).and_then(|i| workbook.worksheet_mut(i))
}

/// The choice lists kept on the settings sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryLists {
    pub employees: Vec<String>,
    pub projects: Vec<String>,
    pub absences: Vec<String>,
}

impl CategoryLists {
    /// Lists offered when the workbook cannot be read
    pub fn fallback() -> Self {
        Self {
            employees: vec!["Muster".into()],
            projects: vec!["MOIA".into(), "DiE".into()],
            absences: vec!["Urlaub".into(), "Krank".into()],
        }
    }

    /// Check whether all three lists are empty
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty() && self.projects.is_empty() && self.absences.is_empty()
    }
}

/// Distinct, trimmed, non-empty labels of one settings column in
/// first-seen order
fn distinct_column(sheet: &Worksheet, col: u16) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for row in LIST_FIRST_ROW..=last_row(sheet) {
        let label = label_of(value_at(sheet, row, col));
        if !label.is_empty() && seen.insert(label.clone()) {
            out.push(label);
        }
    }

    out
}

/// Read the employee, project and absence-type lists.
///
/// A workbook without a settings sheet yields empty lists.
pub fn load_lists(workbook: &Workbook) -> CategoryLists {
    match workbook.worksheet_by_name(SETTINGS_SHEET) {
        Some(sheet) => CategoryLists {
            employees: distinct_column(sheet, EMPLOYEE_LIST_COLUMN),
            projects: distinct_column(sheet, PROJECT_LIST_COLUMN),
            absences: distinct_column(sheet, ABSENCE_LIST_COLUMN),
        },
        None => CategoryLists::default(),
    }
}
