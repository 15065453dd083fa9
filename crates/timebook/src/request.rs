//! Booking requests as entered by a user
//!
//! A [`BookingRequest`] is the raw, possibly incomplete input of a booking
//! form. [`BookingRequest::validate`] turns it into a [`ValidatedBooking`]
//! that can be handed to the writer.

use chrono::NaiveDate;
use thiserror::Error;

use crate::schema::normalize;
use crate::writer::Booking;

/// Hours of a half-day project booking
pub const HALF_DAY_HOURS: f64 = 3.5;

/// Hours of a full-day project booking
pub const FULL_DAY_HOURS: f64 = 7.0;

const HOURS_TOLERANCE: f64 = 1e-9;

/// Why a booking request was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("no employee selected")]
    MissingEmployee,

    #[error("no start date selected")]
    MissingStartDate,

    #[error("no project selected")]
    MissingProject,

    #[error("no absence type selected")]
    MissingAbsence,

    #[error("hours must be 3.5 or 7, got {0}")]
    InvalidHours(f64),

    #[error("remaining hours can only follow a half-day project booking")]
    NoRemainingHours,

    #[error("remaining hours must go to a different project than '{0}'")]
    SameProject(String),
}

/// Raw booking input
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub employee: String,
    pub booking: Booking,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// A complete booking: trimmed names, accepted hours, ordered dates
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBooking {
    pub employee: String,
    pub booking: Booking,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

fn is_accepted_hours(hours: f64) -> bool {
    [HALF_DAY_HOURS, FULL_DAY_HOURS]
        .iter()
        .any(|h| (hours - h).abs() <= HOURS_TOLERANCE)
}

impl BookingRequest {
    /// Check the request and normalize it.
    ///
    /// The end date defaults to the start date; reversed dates are swapped.
    pub fn validate(&self) -> Result<ValidatedBooking, RequestError> {
        let employee = self.employee.trim();
        if employee.is_empty() {
            return Err(RequestError::MissingEmployee);
        }

        let from = self.date_from.ok_or(RequestError::MissingStartDate)?;
        let to = self.date_to.unwrap_or(from);
        let (date_from, date_to) = if to < from { (to, from) } else { (from, to) };

        let booking = match &self.booking {
            Booking::Project { project, hours } => {
                let project = project.trim();
                if project.is_empty() {
                    return Err(RequestError::MissingProject);
                }
                if !is_accepted_hours(*hours) {
                    return Err(RequestError::InvalidHours(*hours));
                }
                Booking::project(project, *hours)
            }
            Booking::Absence { kind } => {
                let kind = kind.trim();
                if kind.is_empty() {
                    return Err(RequestError::MissingAbsence);
                }
                Booking::absence(kind)
            }
        };

        Ok(ValidatedBooking {
            employee: employee.to_string(),
            booking,
            date_from,
            date_to,
        })
    }
}

impl ValidatedBooking {
    /// Book the other half of each day on `rest_project`.
    ///
    /// Only a half-day project booking leaves hours to fill. The follow-up
    /// covers the same employee and dates.
    pub fn remaining_hours_booking(&self, rest_project: &str) -> Result<Self, RequestError> {
        let Booking::Project { project, hours } = &self.booking else {
            return Err(RequestError::NoRemainingHours);
        };
        if (hours - HALF_DAY_HOURS).abs() > HOURS_TOLERANCE {
            return Err(RequestError::NoRemainingHours);
        }

        let rest_project = rest_project.trim();
        if rest_project.is_empty() {
            return Err(RequestError::MissingProject);
        }
        if normalize(rest_project) == normalize(project) {
            return Err(RequestError::SameProject(project.clone()));
        }

        Ok(Self {
            employee: self.employee.clone(),
            booking: Booking::project(rest_project, FULL_DAY_HOURS - HALF_DAY_HOURS),
            date_from: self.date_from,
            date_to: self.date_to,
        })
    }
}
