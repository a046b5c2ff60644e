use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored image location. `path` and `filename` are each unique on their own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub path: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImageRecord {
    pub fn new(path: impl Into<String>, filename: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            path: path.into(),
            filename: filename.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
