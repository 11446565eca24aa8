// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types and timestamp codecs for storage rows.
//!
//! The canonical types are defined in `pawlink-core::types` for use across
//! adapter trait boundaries; this module re-exports them and provides the
//! RFC 3339 encoding used in TEXT columns.

use chrono::{DateTime, SecondsFormat, Utc};

pub use pawlink_core::types::{Conversation, ConversationRecord, Message, Profile};

/// Encode a timestamp for a TEXT column.
///
/// Fixed millisecond precision with a `Z` suffix so that lexicographic
/// ordering matches chronological ordering.
pub(crate) fn fmt_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decode a timestamp from a TEXT column at the given result column index.
pub(crate) fn parse_timestamp(idx: usize, value: String) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_round_trips() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 45).unwrap();
        let encoded = fmt_timestamp(ts);
        let decoded = parse_timestamp(0, encoded).unwrap();
        assert_eq!(decoded, ts);
    }

    #[test]
    fn encoding_orders_lexicographically() {
        let earlier = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 1).unwrap();
        assert!(fmt_timestamp(earlier) < fmt_timestamp(later));
    }

    #[test]
    fn malformed_timestamp_is_an_error() {
        assert!(parse_timestamp(0, "not-a-time".to_string()).is_err());
    }
}
