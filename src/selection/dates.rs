use chrono::{DateTime, Duration, FixedOffset, Months, NaiveDate, TimeZone, Utc};

use crate::feed::to_iso_string;

/// A day-granularity bound parsed from a `YYYYMMDD` request value.
///
/// Malformed input is not rejected: it becomes [`DateBound::Invalid`], which
/// still counts as "supplied" (date mode wins over pagination) but never
/// excludes an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    /// Midnight of the given day in the request timezone
    Valid(DateTime<FixedOffset>),
    Invalid,
}

impl DateBound {
    pub fn instant(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            DateBound::Valid(ts) => Some(ts),
            DateBound::Invalid => None,
        }
    }

    /// ISO-8601 UTC rendering for the response echo; `None` when invalid.
    pub fn to_iso(&self) -> Option<String> {
        self.instant()
            .map(|ts| to_iso_string(&ts.with_timezone(&Utc)))
    }
}

/// Parses `YYYYMMDD` as local midnight in `tz`.
///
/// Segments are taken positionally (`0..4`, `4..6`, `6..8`), so trailing
/// characters are ignored and a missing segment reads as 0. Two-digit years
/// map to 19xx. Numeric components roll over like calendar arithmetic:
/// `20240230` is March 1st and a day of `00` is the last day of the previous
/// month. Only a segment containing a non-digit makes the bound invalid.
pub fn parse_compact_date<Tz: TimeZone>(value: &str, tz: &Tz) -> DateBound {
    let year = segment(value, 0, 4).and_then(digits);
    let month = segment(value, 4, 6).and_then(digits);
    let day = segment(value, 6, 8).and_then(digits);

    let (Some(year), Some(month), Some(day)) = (year, month, day) else {
        return DateBound::Invalid;
    };
    let year = if (0..=99).contains(&year) { 1900 + year } else { year };

    rolled_date(year, month, day)
        .and_then(|date| local_midnight(tz, date))
        .map(|ts| DateBound::Valid(ts.fixed_offset()))
        .unwrap_or(DateBound::Invalid)
}

/// Jan 1st of `year`, plus `month - 1` months, plus `day - 1` days.
fn rolled_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1)?;
    let months = Months::new(u32::try_from((month - 1).unsigned_abs()).ok()?);
    let first_of_month = if month >= 1 {
        first.checked_add_months(months)?
    } else {
        first.checked_sub_months(months)?
    };
    first_of_month.checked_add_signed(Duration::days(day - 1))
}

/// Start of `date` in `tz`. When midnight falls in a DST gap the day starts
/// at the first representable hour instead.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    (0..=2)
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
}

/// Parses a normalized item date. Accepts RFC 3339 and RFC 2822.
pub fn parse_item_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .ok()
}

fn segment(value: &str, start: usize, end: usize) -> Option<&str> {
    let len = value.len();
    value.get(start.min(len)..end.min(len))
}

/// Empty reads as 0; anything other than ASCII digits is rejected.
fn digits(s: &str) -> Option<i64> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.is_empty() {
        return Some(0);
    }
    s.parse().ok()
}
