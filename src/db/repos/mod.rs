mod audit_events;

pub use audit_events::*;
use chrono::{DateTime, Utc};

/// Truncate a timestamp to millisecond precision.
///
/// Event dates are stored with millisecond precision on both backends. Dates
/// and cutoffs must be truncated the same way before they reach the database,
/// otherwise an event dated exactly at a cutoff can compare as older than it
/// (SQLite compares the stored text, Postgres keeps microseconds).
pub fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_truncate_to_millis_drops_sub_millisecond_precision() {
        let dt = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let truncated = truncate_to_millis(dt);
        assert_eq!(truncated.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(truncated.timestamp(), dt.timestamp());
    }

    #[test]
    fn test_truncate_to_millis_is_idempotent() {
        let dt = truncate_to_millis(Utc::now());
        assert_eq!(truncate_to_millis(dt), dt);
    }
}
