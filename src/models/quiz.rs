use crate::models::question::Question;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// One quiz maps 1:1 to one course by shared id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub questions: JsonValue,
    pub time_limit_minutes: i32,
    pub difficulty: String,
    pub tags: Option<JsonValue>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Quiz {
    pub fn parsed_questions(&self) -> Vec<Question> {
        serde_json::from_value(self.questions.clone()).unwrap_or_default()
    }
}
