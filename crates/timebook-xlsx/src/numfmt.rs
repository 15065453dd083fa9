//! Number format classification and Excel serial date conversion
//!
//! Spreadsheet dates are plain numbers; only the cell's number format marks
//! them as dates. The reader uses [`is_date_format_id`] and
//! [`is_date_format`] to decide which numeric cells become
//! [`timebook_core::CellValue::DateTime`].

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Built-in number format ids that render as dates or times
/// (ECMA-376 Part 1, 18.8.30)
pub const fn is_builtin_date_format(id: u32) -> bool {
    matches!(id, 14..=22 | 45..=47)
}

/// Check if a format code is a date/time format
///
/// Quoted literals, bracketed sections (colors, locales, conditions) and
/// backslash escapes are ignored; any remaining `d`, `m`, `y`, `h` or `s`
/// token makes it a date format.
pub fn is_date_format(format_code: &str) -> bool {
    let lower = format_code.to_lowercase();
    if lower == "general" || lower == "@" {
        return false;
    }

    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut escaped = false;
    let mut cleaned = String::new();

    for c in lower.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if !in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            _ if !in_quotes && !in_brackets => cleaned.push(c),
            _ => {}
        }
    }

    // Only the first section decides; "0.00;[Red]-0.00" stays numeric
    let first = cleaned.split(';').next().unwrap_or_default();
    first.contains(['d', 'm', 'y', 'h', 's'])
}

/// Decide whether a number format id (with the workbook's custom
/// `numFmts`) renders as a date
pub fn is_date_format_id(id: u32, custom_code: Option<&str>) -> bool {
    match custom_code {
        Some(code) => is_date_format(code),
        None => is_builtin_date_format(id),
    }
}

fn epoch_1900() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or_default()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
}

fn epoch_1904() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1904, 1, 1)
        .unwrap_or_default()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
}

/// Convert an Excel serial number to a date-time
///
/// The 1900 system carries Lotus' phantom 1900-02-29 (serial 60): serials
/// below 61 are shifted by one day so 1 is 1900-01-01. Times are rounded to
/// the nearest second. Returns `None` for negative or out-of-range serials.
#[allow(clippy::cast_possible_truncation)]
pub fn serial_to_datetime(serial: f64, date1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_465.999_999 {
        return None;
    }

    let (epoch, serial) = if date1904 {
        (epoch_1904(), serial)
    } else if serial < 61.0 {
        (epoch_1900() + Duration::days(1), serial)
    } else {
        (epoch_1900(), serial)
    };

    let millis = (serial * 86_400_000.0).round() as i64;
    let seconds = (millis + 500).div_euclid(1000);
    epoch.checked_add_signed(Duration::seconds(seconds))
}

/// Convert a date-time to an Excel serial number
#[allow(clippy::cast_precision_loss)]
pub fn datetime_to_serial(dt: NaiveDateTime, date1904: bool) -> f64 {
    let epoch = if date1904 { epoch_1904() } else { epoch_1900() };
    let seconds = (dt - epoch).num_seconds() as f64;
    let mut serial = seconds / 86_400.0;
    if !date1904 && serial < 61.0 {
        serial -= 1.0;
    }
    serial
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_builtin_date_ids() {
        assert!(is_builtin_date_format(14));
        assert!(is_builtin_date_format(22));
        assert!(is_builtin_date_format(46));
        assert!(!is_builtin_date_format(0));
        assert!(!is_builtin_date_format(2));
        assert!(!is_builtin_date_format(49));
    }

    #[test]
    fn test_custom_date_formats() {
        assert!(is_date_format("dd.mm.yyyy"));
        assert!(is_date_format("DDD, DD.MM."));
        assert!(is_date_format("[$-407]dddd, d. mmmm yyyy"));
        assert!(is_date_format("hh:mm"));

        assert!(!is_date_format("General"));
        assert!(!is_date_format("0.00"));
        assert!(!is_date_format("0.0 \"h\""));
        assert!(!is_date_format("#,##0.00;[Red]-#,##0.00"));
        assert!(!is_date_format("0\\d"));
    }

    #[test]
    fn test_custom_code_overrides_builtin_id() {
        assert!(is_date_format_id(14, None));
        assert!(!is_date_format_id(164, None));
        assert!(is_date_format_id(164, Some("dd.mm.yy")));
        assert!(!is_date_format_id(14, Some("0.00")));
    }

    #[test]
    fn test_serial_to_datetime_1900() {
        assert_eq!(serial_to_datetime(1.0, false), Some(date(1900, 1, 1)));
        assert_eq!(serial_to_datetime(61.0, false), Some(date(1900, 3, 1)));
        assert_eq!(serial_to_datetime(45658.0, false), Some(date(2025, 1, 1)));
        assert_eq!(serial_to_datetime(46027.0, false), Some(date(2026, 1, 5)));

        let noon = serial_to_datetime(45658.5, false).unwrap();
        assert_eq!(noon, date(2025, 1, 1) + Duration::hours(12));
    }

    #[test]
    fn test_serial_to_datetime_1904() {
        assert_eq!(serial_to_datetime(0.0, true), Some(date(1904, 1, 1)));
        assert_eq!(serial_to_datetime(44196.0, true), Some(date(2025, 1, 1)));
    }

    #[test]
    fn test_serial_out_of_range() {
        assert_eq!(serial_to_datetime(-1.0, false), None);
        assert_eq!(serial_to_datetime(f64::NAN, false), None);
        assert_eq!(serial_to_datetime(1e12, false), None);
    }

    #[test]
    fn test_datetime_to_serial() {
        assert_eq!(datetime_to_serial(date(2025, 1, 1), false), 45658.0);
        assert_eq!(datetime_to_serial(date(1900, 1, 1), false), 1.0);
        assert_eq!(datetime_to_serial(date(2025, 1, 1), true), 44196.0);
    }
}
