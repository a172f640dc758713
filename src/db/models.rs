use crate::types::DailyRecord;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted `apod_data` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct StoredRecord {
    pub id: i64,
    pub title: String,
    pub explanation: String,
    pub url: String,
    pub date: String,
    pub media_type: String,
}

impl From<StoredRecord> for DailyRecord {
    fn from(s: StoredRecord) -> Self {
        DailyRecord {
            title: s.title,
            explanation: s.explanation,
            url: s.url,
            date: s.date,
            media_type: s.media_type,
        }
    }
}

/// What a load did with the record. A skip is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Inserted { id: i64 },
    /// A row for the same date already existed.
    Skipped,
}

impl LoadOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, LoadOutcome::Inserted { .. })
    }
}
