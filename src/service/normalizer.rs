use serde_json::Value;

use crate::types::{DailyRecord, RawApod};

/// Map a raw APOD payload onto a `DailyRecord`.
///
/// Missing fields become empty strings so a sparse payload never aborts the run.
/// Values are not validated; `date` is passed through as sent.
pub fn normalize(raw: &RawApod) -> DailyRecord {
    DailyRecord {
        title: field(raw, "title"),
        explanation: field(raw, "explanation"),
        url: field(raw, "url"),
        date: field(raw, "date"),
        media_type: field(raw, "media_type"),
    }
}

fn field(raw: &RawApod, name: &str) -> String {
    match raw.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
