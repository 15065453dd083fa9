//! # timebook
//!
//! Books project hours and absences into the shared time-sheet workbook
//! (`.xlsm`) and reads back what has already been booked.
//!
//! ## Workbook layout
//!
//! - A settings sheet (`Anpassung`) lists employees, projects and absence
//!   types from row 4 in columns M, N and P.
//! - One sheet per month (`Januar` ... `Dezember`, `März` may be spelled
//!   `Maerz`) holds a date in column C from row 5 and one column block per
//!   employee from column F. Row 3 carries the (merged) employee label,
//!   row 4 the project label of each column. The last column of a block
//!   takes absence types.
//!
//! The workbook is opened for every operation and saved in full after a
//! batch of writes. Only the edited cells change on disk; the VBA project
//! and every other part of the file are written back untouched.
//!
//! ## Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use timebook::prelude::*;
//!
//! let service = BookingService::new(ServiceConfig::new("Zeiterfassung.xlsm"));
//!
//! let lists = service.load_lists()?;
//! println!("employees: {:?}", lists.employees);
//!
//! let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
//! let friday = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
//! let summary = service.write_range("Max", &Booking::project("MOIA", HALF_DAY_HOURS), monday, friday)?;
//! println!("{} day(s) written, {} failed", summary.ok, summary.failed);
//! # Ok::<(), timebook::Error>(())
//! ```

pub mod dates;
pub mod error;
pub mod guard;
pub mod layout;
pub mod prelude;
pub mod request;
pub mod router;
pub mod scanner;
pub mod schema;
pub mod service;
pub mod writer;

pub use error::{Error, Result};
pub use guard::{RetryPolicy, WorkbookGuard};
pub use layout::{resolve_employee_block, resolve_project_column, EmployeeBlock};
pub use request::{
    BookingRequest, RequestError, ValidatedBooking, FULL_DAY_HOURS, HALF_DAY_HOURS,
};
pub use router::{load_lists, month_sheet, resolve_sheet, resolve_sheet_mut, CategoryLists};
pub use scanner::filled_dates;
pub use service::{BookingService, ServiceConfig};
pub use writer::{is_workday, write_one_day, write_range, Booking, DayFailure, WriteSummary};

// Re-export the document types the engine operates on
pub use timebook_core::{CellValue, Workbook, Worksheet};
pub use timebook_xlsx::{XlsmDocument, XlsxError};
