//! HTTP date formatting.

use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};

/// Last second representable as an HTTP date (`Fri, 31 Dec 9999 23:59:59 GMT`).
const MAX_HTTP_DATE_SECS: i64 = 253_402_300_799;

/// Formats a timestamp as an RFC 1123 HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`).
///
/// Sub-second precision is dropped. Timestamps outside 1970..=9999 are
/// clamped to the nearest representable date.
///
/// ```
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
/// assert_eq!(cachet_core::http_date(at), "Sun, 06 Nov 1994 08:49:37 GMT");
/// ```
pub fn http_date(at: DateTime<Utc>) -> String {
    let secs = at.timestamp().clamp(0, MAX_HTTP_DATE_SECS) as u64;
    httpdate::fmt_http_date(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
}
