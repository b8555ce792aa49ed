//! Conversions between storage and API representations

use surrealdb::RecordId;

/// The bare key of a record id, for URLs and API payloads
pub fn record_key(id: &Option<RecordId>) -> String {
    id.as_ref().map(|id| id.key().to_string()).unwrap_or_default()
}
