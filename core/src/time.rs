//! Time related utils.

use chrono::TimeZone;
use chrono::Utc;

use crate::{Error, Result};

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into http date: `Sun, 06 Nov 1994 08:49:37 GMT`
///
/// ## Note
///
/// HTTP date is slightly different from RFC2822.
///
/// - Timezone is fixed to GMT.
/// - Day must be 2 digit.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse time from RFC2822 / http date.
pub fn parse_rfc2822(s: &str) -> Result<DateTime> {
    Ok(chrono::DateTime::parse_from_rfc2822(s)
        .map_err(|e| Error::decode(format!("parse '{s}' into rfc2822 failed")).with_source(e))?
        .with_timezone(&Utc))
}

/// Build datetime from seconds since unix epoch.
pub fn from_timestamp(secs: i64) -> Result<DateTime> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| Error::request_invalid(format!("timestamp {secs} is out of range")))
}
