// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request timestamps and identifiers.
//!
//! The carrier formats all request times in GMT+7 regardless of where the
//! caller runs. Two renderings exist on the wire: the `*-request-at` header
//! format with centisecond precision and a colon in the zone offset, and a
//! compact format without the colon used as signature input.

use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;

const GMT7_SECS: i32 = 7 * 3600;

/// Current time in the carrier's timezone (GMT+7).
pub fn now_gmt7() -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(GMT7_SECS).expect("static offset is in range");
    Utc::now().with_timezone(&offset)
}

/// A GMT+7 wall-clock view of an epoch-second value. Settlement requests
/// stamp `x-request-at` from the envelope's signature time rather than the
/// local clock.
pub fn gmt7_from_epoch(secs: i64) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(GMT7_SECS).expect("static offset is in range");
    DateTime::from_timestamp(secs, 0)
        .unwrap_or_else(|| DateTime::UNIX_EPOCH)
        .with_timezone(&offset)
}

/// Render a timestamp the way the backend's Java stack does:
/// `2023-10-20T12:34:56.78+07:00` (centiseconds, colon in the offset).
pub fn java_like_timestamp(at: DateTime<FixedOffset>) -> String {
    let centis = at.timestamp_subsec_millis() / 10;
    format!(
        "{}.{:02}{}",
        at.format("%Y-%m-%dT%H:%M:%S"),
        centis,
        at.format("%:z")
    )
}

/// Render a GMT+7 timestamp without a colon in the offset
/// (`2023-10-20T12:34:56+0700`), the form CIAM signs over.
pub fn compact_timestamp(at: DateTime<FixedOffset>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%z").to_string()
}

/// Fresh identifier for exactly one outbound request.
pub fn request_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_gmt7(ms: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(GMT7_SECS)
            .unwrap()
            .with_ymd_and_hms(2023, 10, 20, 12, 34, 56)
            .unwrap()
            + chrono::Duration::milliseconds(ms as i64)
    }

    #[test]
    fn java_like_timestamp_uses_centiseconds_and_colon_offset() {
        assert_eq!(
            java_like_timestamp(fixed_gmt7(780)),
            "2023-10-20T12:34:56.78+07:00"
        );
    }

    #[test]
    fn java_like_timestamp_pads_fraction() {
        assert_eq!(
            java_like_timestamp(fixed_gmt7(30)),
            "2023-10-20T12:34:56.03+07:00"
        );
    }

    #[test]
    fn compact_timestamp_drops_offset_colon() {
        assert_eq!(compact_timestamp(fixed_gmt7(0)), "2023-10-20T12:34:56+0700");
    }

    #[test]
    fn now_gmt7_reports_plus_seven() {
        assert_eq!(now_gmt7().offset().local_minus_utc(), GMT7_SECS);
    }

    #[test]
    fn request_ids_are_unique_per_call() {
        assert_ne!(request_id(), request_id());
    }
}
