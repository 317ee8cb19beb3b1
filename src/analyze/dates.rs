use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};

/// Parse a publication date in any of the encodings GDELT exports use.
///
/// Accepted: `YYYYMMDD`, `YYYYMMDDHHMMSS`, `YYYY-MM-DD`,
/// `YYYY-MM-DD HH:MM:SS`, RFC 3339. Anything else yields `None`.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    // pandas round-trips integer SQLDATE columns as "20250703.0"
    let s = s.strip_suffix(".0").unwrap_or(s);

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok();
    }
    if s.len() == 14 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%S")
            .ok()
            .map(|dt| dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Calendar fields derived from a parsed date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temporal {
    pub year: i32,
    pub month: u32,
    pub weekday: Weekday,
}

impl Temporal {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            weekday: date.weekday(),
        }
    }
}

pub fn weekday_name(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Calendar quarter, 1..=4.
pub fn quarter(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}
