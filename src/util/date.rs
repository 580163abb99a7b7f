use chrono::{
  DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc,
};

const DATE_TIME_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S %z", // Common format with timezone
  "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S", // Common format without timezone
  "%Y-%m-%d %H:%M",
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &[
  "%Y-%m-%d", // Date only
  "%Y/%m/%d",
];

/// Parse a date the way frontmatter authors tend to write them. Values
/// without an offset are taken as UTC so builds do not depend on the
/// machine's timezone.
pub fn parse_date(date_str: impl AsRef<str>) -> Option<DateTime<FixedOffset>> {
  let date_str = date_str.as_ref().trim();
  if date_str.is_empty() {
    return None;
  }

  if let Ok(parsed) = DateTime::parse_from_rfc3339(date_str) {
    return Some(parsed);
  }

  if let Ok(parsed) = DateTime::parse_from_rfc2822(date_str) {
    return Some(parsed);
  }

  for fmt in DATE_TIME_FORMATS {
    if let Ok(parsed) = DateTime::parse_from_str(date_str, fmt) {
      return Some(parsed);
    }
  }

  for fmt in NAIVE_DATE_TIME_FORMATS {
    if let Ok(parsed) = NaiveDateTime::parse_from_str(date_str, fmt) {
      return Some(parsed.and_utc().fixed_offset());
    }
  }

  for fmt in DATE_FORMATS {
    if let Ok(parsed) = NaiveDate::parse_from_str(date_str, fmt) {
      return Some(parsed.and_time(NaiveTime::MIN).and_utc().fixed_offset());
    }
  }

  None
}

/// Milliseconds since the Unix epoch.
pub fn from_millis(millis: i64) -> Option<DateTime<FixedOffset>> {
  DateTime::from_timestamp_millis(millis).map(|date| date.fixed_offset())
}

/// RFC-822 date as RSS readers expect it, always in GMT.
pub fn to_rfc822(date: &DateTime<FixedOffset>) -> String {
  date
    .with_timezone(&Utc)
    .format("%a, %d %b %Y %H:%M:%S GMT")
    .to_string()
}
