//! Active Directory FileTime decoding
//!
//! A FileTime is a decimal count of 100-nanosecond intervals since
//! 1601-01-01T00:00:00Z. Sub-second precision is dropped.

use chrono::{DateTime, Utc};
use std::num::ParseIntError;
use thiserror::Error;

/// Seconds between 1601-01-01 and 1970-01-01.
pub const FILETIME_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

/// 100ns intervals per second.
pub const FILETIME_TICKS_PER_SEC: i64 = 10_000_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileTimeError {
    #[error("empty FileTime value")]
    Empty,

    #[error("invalid FileTime value {raw:?}: {source}")]
    Invalid {
        raw: String,
        #[source]
        source: ParseIntError,
    },

    #[error("FileTime value {raw} is outside the representable range")]
    OutOfRange { raw: String },
}

/// Decode a FileTime string into a UTC timestamp.
pub fn decode_file_time(raw: &str) -> Result<DateTime<Utc>, FileTimeError> {
    if raw.is_empty() {
        return Err(FileTimeError::Empty);
    }

    let ticks: i64 = raw.parse().map_err(|source| FileTimeError::Invalid {
        raw: raw.to_string(),
        source,
    })?;

    let unix_secs = ticks / FILETIME_TICKS_PER_SEC - FILETIME_EPOCH_OFFSET_SECS;

    DateTime::from_timestamp(unix_secs, 0).ok_or_else(|| FileTimeError::OutOfRange {
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_decode_golden_value() {
        let decoded = decode_file_time("133753723630000000").unwrap();
        assert_eq!(decoded, Utc.with_ymd_and_hms(2024, 11, 6, 13, 12, 43).unwrap());
    }

    #[test]
    fn test_decode_unix_epoch() {
        let decoded = decode_file_time("116444736000000000").unwrap();
        assert_eq!(decoded, Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_decode_truncates_sub_second_ticks() {
        let decoded = decode_file_time("133753723639999999").unwrap();
        assert_eq!(decoded, Utc.with_ymd_and_hms(2024, 11, 6, 13, 12, 43).unwrap());
    }

    #[test]
    fn test_decode_directory_epoch() {
        let decoded = decode_file_time("0").unwrap();
        assert_eq!(decoded, Utc.with_ymd_and_hms(1601, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_decode_empty_is_distinct_error() {
        assert_eq!(decode_file_time(""), Err(FileTimeError::Empty));
    }

    #[test]
    fn test_decode_non_numeric() {
        for raw in ["abc", "12a", " 1", "1.5", "99999999999999999999"] {
            let err = decode_file_time(raw).unwrap_err();
            assert!(
                matches!(err, FileTimeError::Invalid { .. }),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_decode_max_value_is_representable() {
        let decoded = decode_file_time("9223372036854775807").unwrap();
        assert!(decoded.timestamp() > 0);
    }
}
