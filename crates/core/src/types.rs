/// A flat key/value record: a form snapshot or one item of a collection.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Timestamps are compared in the offset of the clock that drives a query.
pub type Timestamp = chrono::DateTime<chrono::FixedOffset>;
