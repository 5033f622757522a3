use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type EntryID = i64;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub content: String,
    /// Local calendar day the entry was written on, `YYYY-MM-DD`
    pub day_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug)]
pub struct AddEntryRequest {
    pub content: String,
    /// Backdates the entry; defaults to now
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AddEntryResult {
    pub entry_id: EntryID,
}

#[derive(Deserialize, Debug)]
pub struct SetEntryRequest {
    pub entry_id: EntryID,
    pub content: String,
}

#[derive(Deserialize, Debug)]
pub struct DeleteEntryRequest {
    pub entry_id: EntryID,
}
