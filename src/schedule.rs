use crate::error::{CallFileError, Result};
use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

const LOCAL_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse a placement time given on the command line or in a document.
///
/// Accepted forms: `now`, an RFC 3339 timestamp, a local
/// `YYYY-MM-DD HH:MM[:SS]`, or an offset from now such as `+90s`, `+5m`,
/// `+2h`, `+1d` (a bare `+n` means seconds).
pub fn parse_time(input: &str) -> Result<DateTime<Utc>> {
    parse_time_from(input, Utc::now())
}

pub fn parse_time_from(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CallFileError::InvalidTime("empty time".to_string()));
    }
    if input.eq_ignore_ascii_case("now") {
        return Ok(now);
    }
    if let Some(offset) = input.strip_prefix('+') {
        return parse_offset(offset).map(|d| now + d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return match Local.from_local_datetime(&naive) {
                LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
                LocalResult::Ambiguous(_, _) => Err(CallFileError::InvalidTime(format!(
                    "`{}` is ambiguous in the local time zone",
                    input
                ))),
                LocalResult::None => Err(CallFileError::InvalidTime(format!(
                    "`{}` does not exist in the local time zone",
                    input
                ))),
            };
        }
    }
    Err(CallFileError::InvalidTime(format!(
        "`{}` is not a recognised time",
        input
    )))
}

fn parse_offset(offset: &str) -> Result<Duration> {
    let invalid = || CallFileError::InvalidTime(format!("`+{}` is not a valid offset", offset));
    let (digits, unit) = match offset.find(|c: char| !c.is_ascii_digit()) {
        Some(pos) => offset.split_at(pos),
        None => (offset, "s"),
    };
    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    let seconds = match unit {
        "s" => Some(amount),
        "m" => amount.checked_mul(60),
        "h" => amount.checked_mul(3600),
        "d" => amount.checked_mul(86400),
        _ => None,
    }
    .ok_or_else(invalid)?;
    Duration::try_seconds(seconds).ok_or_else(invalid)
}

/// Convert a placement time into a file timestamp. Times before the UNIX
/// epoch cannot be represented as an mtime the switch would honour.
pub fn to_file_time(time: &DateTime<Utc>) -> Result<SystemTime> {
    if time.timestamp() < 0 {
        return Err(CallFileError::InvalidTime(format!(
            "{} is before the UNIX epoch",
            time.to_rfc3339()
        )));
    }
    let since_epoch = time
        .signed_duration_since(DateTime::<Utc>::from(UNIX_EPOCH))
        .to_std()
        .map_err(|e| CallFileError::InvalidTime(e.to_string()))?;
    UNIX_EPOCH
        .checked_add(since_epoch)
        .ok_or_else(|| CallFileError::InvalidTime(format!("{} is out of range", time)))
}
