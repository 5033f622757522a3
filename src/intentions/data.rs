use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::internal_error::InternalError;
use crate::urgency::Urgency;

pub type IntentionID = i64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IntentionStatus {
    Pending,
    Completed,
}

impl IntentionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentionStatus::Pending => "pending",
            IntentionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for IntentionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentionStatus {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<IntentionStatus, InternalError> {
        match s {
            "pending" => Ok(IntentionStatus::Pending),
            "completed" => Ok(IntentionStatus::Completed),
            other => Err(InternalError::CorruptRecord(format!(
                "unknown intention status '{other}'"
            ))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Intention {
    pub title: String,
    pub due_date: Option<NaiveDate>,
    /// Open-ended goal with no deadline
    pub is_life_goal: bool,
    pub status: IntentionStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClassifiedIntention {
    pub intention_id: IntentionID,
    pub intention: Intention,
    pub urgency: Urgency,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UrgencyGroup {
    pub urgency: Urgency,
    pub intentions: Vec<(IntentionID, Intention)>,
}

#[derive(Deserialize, Debug)]
pub struct AddIntentionRequest {
    pub title: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub is_life_goal: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AddIntentionResult {
    pub intention_id: IntentionID,
}

#[derive(Deserialize, Debug)]
pub struct SetIntentionRequest {
    pub intention_id: IntentionID,
    pub title: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub is_life_goal: bool,
}

#[derive(Deserialize, Debug)]
pub struct IntentionRequest {
    pub intention_id: IntentionID,
}
