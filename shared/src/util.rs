/// Current UTC time as an RFC 3339 string.
///
/// All entity timestamps (`created_at`, `last_update`) are stored as RFC 3339
/// strings so they sort lexicographically and survive JSON round-trips
/// without precision surprises.
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Generate a new entity ID.
///
/// Hyphen-free UUID v4. IDs are opaque strings everywhere in the domain;
/// the remote service stores them in plain text columns.
pub fn entity_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Today's date as `YYYY-MM-DD` (used for event scheduling defaults).
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
