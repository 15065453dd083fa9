//! What a cell holds

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Content of one cell as read from, or written to, a worksheet part
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    /// Hours and every other plain number
    Number(f64),
    /// Names, project labels, absence kinds
    String(String),
    /// A serial number under a date format, or a `t="d"` cell
    DateTime(NaiveDateTime),
    Error(CellError),
    /// Formula text (with the leading `=`) and the result Excel stored with it
    Formula {
        text: String,
        cached_value: Option<Box<CellValue>>,
    },
}

impl CellValue {
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// Strictly [`CellValue::Empty`]; see [`CellValue::is_blank`] for the looser test
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// No booking content: nothing, `""`, `0` or `FALSE`
    ///
    /// A formula counts by its cached result; one without a result is content.
    pub fn is_blank(&self) -> bool {
        match self.effective_value() {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            CellValue::Number(n) => *n == 0.0,
            CellValue::Boolean(b) => !b,
            CellValue::DateTime(_) | CellValue::Error(_) | CellValue::Formula { .. } => false,
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula { .. })
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.effective_value() {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self.effective_value() {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self.effective_value() {
            CellValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// The cached result for a formula, the value itself otherwise
    pub fn effective_value(&self) -> &CellValue {
        match self {
            CellValue::Formula {
                cached_value: Some(cached),
                ..
            } => cached.effective_value(),
            _ => self,
        }
    }

    /// Text as a person would type it: `7` rather than `7.0`, a bare date
    /// when there is no time of day
    pub fn to_text(&self) -> String {
        match self.effective_value() {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => (*n as i64).to_string(),
            CellValue::DateTime(dt) if dt.time() == NaiveTime::MIN => dt.date().to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.effective_value() {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => f.write_str(s),
            CellValue::DateTime(dt) => write!(f, "{}", dt),
            CellValue::Error(e) => f.write_str(e.as_str()),
            CellValue::Formula { text, .. } => f.write_str(text),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::DateTime(d.and_time(NaiveTime::MIN))
    }
}

/// Error literals a cell can carry (`t="e"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    Na,
}

const ERROR_LITERALS: [(CellError, &str); 7] = [
    (CellError::Null, "#NULL!"),
    (CellError::Div0, "#DIV/0!"),
    (CellError::Value, "#VALUE!"),
    (CellError::Ref, "#REF!"),
    (CellError::Name, "#NAME?"),
    (CellError::Num, "#NUM!"),
    (CellError::Na, "#N/A"),
];

impl CellError {
    pub fn as_str(&self) -> &'static str {
        ERROR_LITERALS
            .iter()
            .find(|(e, _)| e == self)
            .map_or("#N/A", |(_, literal)| literal)
    }

    /// Case-insensitive; unknown literals give `None`
    pub fn parse(s: &str) -> Option<Self> {
        ERROR_LITERALS
            .iter()
            .find(|(_, literal)| literal.eq_ignore_ascii_case(s.trim()))
            .map(|(e, _)| *e)
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
