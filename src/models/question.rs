use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: i32,
    pub text: String,
    pub options: Vec<String>,
    /// Stringified index into `options`. Stored as text by the seed tooling;
    /// comparison is strictly numeric after integer parsing.
    pub correct_answer: String,
    pub explanation: Option<String>,
}

impl Question {
    pub fn correct_index(&self) -> Option<i64> {
        self.correct_answer.trim().parse().ok()
    }
}
