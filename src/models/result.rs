use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted outcome of one submitted attempt. Append-only: never updated or
/// deleted once created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizResult {
    pub id: Uuid,
    pub quiz_id: String,
    pub user_id: String,
    pub score: i32,
    pub total_questions: i32,
    pub time_spent_seconds: i32,
    pub answers: JsonValue,
    pub submitted_at: DateTime<Utc>,
}

impl QuizResult {
    pub fn parsed_answers(&self) -> Vec<i32> {
        serde_json::from_value(self.answers.clone()).unwrap_or_default()
    }
}
