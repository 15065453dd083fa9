//! Stateless booking service
//!
//! Every call opens the workbook, does its work and lets the document go
//! before returning. Nothing is cached between calls, so the service always
//! sees what other programs last saved.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::Result;
use crate::guard::{RetryPolicy, WorkbookGuard};
use crate::request::{BookingRequest, ValidatedBooking};
use crate::router::{self, CategoryLists};
use crate::scanner;
use crate::writer::{self, Booking, WriteSummary};

/// Where the workbook lives and how to open it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub workbook_path: PathBuf,
    pub retry: RetryPolicy,
}

impl ServiceConfig {
    /// Configuration for the workbook at `path` with the default retry policy
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            workbook_path: path.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Configuration for `file_name` inside `base_dir`
    pub fn from_parts<D: AsRef<Path>, F: AsRef<Path>>(base_dir: D, file_name: F) -> Self {
        Self::new(base_dir.as_ref().join(file_name))
    }

    /// Replace the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Reads lists and fill state from, and writes bookings into, one workbook
#[derive(Debug, Clone)]
pub struct BookingService {
    guard: WorkbookGuard,
}

impl BookingService {
    /// Create a service for the configured workbook
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            guard: WorkbookGuard::new(config.workbook_path, config.retry),
        }
    }

    /// Path of the workbook
    pub fn workbook_path(&self) -> &Path {
        self.guard.path()
    }

    /// Employee, project and absence-type lists from the settings sheet
    pub fn load_lists(&self) -> Result<CategoryLists> {
        let doc = self.guard.open()?;
        let lists = router::load_lists(doc.workbook());
        debug!(
            employees = lists.employees.len(),
            projects = lists.projects.len(),
            absences = lists.absences.len(),
            "lists loaded"
        );
        Ok(lists)
    }

    /// Days of `month` that already hold a booking for `employee`
    pub fn filled_dates(&self, employee: &str, month: NaiveDate) -> Result<BTreeSet<NaiveDate>> {
        let employee = employee.trim();
        if employee.is_empty() {
            return Ok(BTreeSet::new());
        }

        let doc = self.guard.open()?;
        let filled = scanner::filled_dates(doc.workbook(), employee, month);
        debug!(employee, %month, days = filled.len(), "fill state scanned");
        Ok(filled)
    }

    /// Write `booking` on every weekday of the range and save once
    pub fn write_range(
        &self,
        employee: &str,
        booking: &Booking,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<WriteSummary> {
        writer::write_range(&self.guard, employee, booking, date_from, date_to)
    }

    /// Write a validated booking
    pub fn book(&self, request: &ValidatedBooking) -> Result<WriteSummary> {
        let summary = self.write_range(
            &request.employee,
            &request.booking,
            request.date_from,
            request.date_to,
        )?;
        if summary.nothing_written() {
            info!(employee = %request.employee, "booking wrote nothing");
        }
        Ok(summary)
    }

    /// Validate a raw request and write it
    pub fn submit(&self, request: &BookingRequest) -> Result<WriteSummary> {
        let booking = request.validate()?;
        self.book(&booking)
    }
}
