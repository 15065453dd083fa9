//! Prelude module - common imports for timebook users
//!
//! ```rust
//! use timebook::prelude::*;
//! ```

pub use crate::{
    // Bookings
    Booking,
    BookingRequest,
    // Service
    BookingService,
    CategoryLists,
    DayFailure,

    // Error types
    Error,
    RequestError,
    Result,
    RetryPolicy,
    ServiceConfig,
    ValidatedBooking,
    WriteSummary,

    // Constants
    FULL_DAY_HOURS,
    HALF_DAY_HOURS,
};
