//! Result-typed field parsers.
//!
//! Parsers never fail: a value is either present, missing, or unparseable
//! with the raw text kept so the nulling can be attributed and logged.

/// Outcome of parsing one raw cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<T> {
    Present(T),
    /// No value was supplied.
    Missing,
    /// A value was supplied but could not be parsed.
    Unparseable(String),
}

impl<T> FieldValue<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Missing | Self::Unparseable(_) => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Raw text when the value was rejected.
    pub fn rejected(&self) -> Option<&str> {
        match self {
            Self::Unparseable(raw) => Some(raw),
            _ => None,
        }
    }

    pub fn from_parse(raw: Option<&str>, parse: impl FnOnce(&str) -> Option<T>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Missing,
            Some(text) => match parse(text) {
                Some(value) => Self::Present(value),
                None => Self::Unparseable(text.to_string()),
            },
        }
    }
}

/// Parses a finite floating-point number.
pub fn parse_numeric(raw: Option<&str>) -> FieldValue<f64> {
    FieldValue::from_parse(raw, |text| {
        text.parse::<f64>().ok().filter(|value| value.is_finite())
    })
}

/// Keeps only digits, `.` and `-`. Returns `None` when nothing is left.
///
/// `"380.5 km"` becomes `"380.5"`, `"86*"` becomes `"86"`, `"*"` becomes `None`.
pub fn strip_numeric_decoration(raw: &str) -> Option<String> {
    let kept: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-')
        .collect();
    if kept.is_empty() { None } else { Some(kept) }
}

/// Strips decoration, then parses. Rejections keep the original raw text.
pub fn parse_decorated_numeric(raw: Option<&str>) -> FieldValue<f64> {
    let Some(text) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return FieldValue::Missing;
    };
    match strip_numeric_decoration(text) {
        None => FieldValue::Missing,
        Some(stripped) => match parse_numeric(Some(&stripped)) {
            FieldValue::Present(value) => FieldValue::Present(value),
            _ => FieldValue::Unparseable(text.to_string()),
        },
    }
}

/// Free text: trimmed, empty becomes missing.
pub fn parse_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
