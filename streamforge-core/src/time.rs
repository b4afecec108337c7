use chrono::{DateTime, SecondsFormat, Utc};

/// The server's current time, in UTC. Centralized so tests can reason about
/// a single source of "now" if that ever needs to become injectable.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Formats a timestamp in the single canonical ISO-8601 textual form used
/// for every persisted timestamp (spec.md §4.2): RFC 3339, UTC, millisecond
/// precision, always including the trailing `Z`.
pub fn to_canonical(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a canonical timestamp string back into a `DateTime<Utc>`.
pub fn parse_canonical(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
