//! Caption offset parsing.
//!
//! Script generators emit scene offsets either as plain seconds (`3.5`) or as
//! clock strings (`"00:03.5"`, `"0:00:03"`). Both are normalized to seconds.

use thiserror::Error;

/// Longest offset accepted in a script (one hour).
pub const MAX_OFFSET_SECS: f64 = 3600.0;

/// Offset parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("timestamp cannot be empty")]
    Empty,

    #[error("timestamp cannot be negative")]
    Negative,

    #[error("invalid timestamp '{0}', expected SS, MM:SS or HH:MM:SS")]
    InvalidFormat(String),

    #[error("timestamp {0}s exceeds the maximum offset of one hour")]
    TooLarge(f64),
}

/// Parse an offset string (`SS`, `MM:SS` or `HH:MM:SS`, fractional seconds allowed).
///
/// # Examples
/// ```
/// use ootd_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("90").unwrap(), 90.0);
/// assert_eq!(parse_timestamp("01:30").unwrap(), 90.0);
/// assert_eq!(parse_timestamp("0:00:07.5").unwrap(), 7.5);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    if parts.len() > 3 {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    let mut total = 0.0;
    for part in &parts {
        let value: f64 = part
            .trim()
            .parse()
            .map_err(|_| TimestampError::InvalidFormat(ts.to_string()))?;
        if !value.is_finite() {
            return Err(TimestampError::InvalidFormat(ts.to_string()));
        }
        if value < 0.0 {
            return Err(TimestampError::Negative);
        }
        total = total * 60.0 + value;
    }

    check_offset(total)
}

/// Validate an offset already expressed in seconds.
pub fn check_offset(secs: f64) -> Result<f64, TimestampError> {
    if !secs.is_finite() {
        return Err(TimestampError::InvalidFormat(secs.to_string()));
    }
    if secs < 0.0 {
        return Err(TimestampError::Negative);
    }
    if secs > MAX_OFFSET_SECS {
        return Err(TimestampError::TooLarge(secs));
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_formats() {
        assert_eq!(parse_timestamp("8").unwrap(), 8.0);
        assert_eq!(parse_timestamp("00:08").unwrap(), 8.0);
        assert_eq!(parse_timestamp("00:01:02.5").unwrap(), 62.5);
        assert_eq!(parse_timestamp(" 12.25 ").unwrap(), 12.25);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_timestamp(""), Err(TimestampError::Empty));
        assert_eq!(parse_timestamp("-3"), Err(TimestampError::Negative));
        assert!(matches!(
            parse_timestamp("1:2:3:4"),
            Err(TimestampError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_timestamp("abc"),
            Err(TimestampError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_timestamp("02:00:00"),
            Err(TimestampError::TooLarge(_))
        ));
    }
}
