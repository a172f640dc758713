use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw APOD payload as returned by the upstream endpoint.
pub type RawApod = Map<String, Value>;

/// The five persisted APOD fields. `date` is the business key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub title: String,
    pub explanation: String,
    pub url: String,
    pub date: String,
    pub media_type: String,
}
