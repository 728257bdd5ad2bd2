use crate::error::{Error, Result};
use crate::models::quiz::Quiz;
use sqlx::PgPool;

#[derive(Clone)]
pub struct QuizService {
    pool: PgPool,
}

impl QuizService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_quiz(&self, quiz_id: &str) -> Result<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"SELECT id, title, description, questions, time_limit_minutes,
                      difficulty, tags, created_at, updated_at
               FROM quizzes WHERE id = $1"#,
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Quiz '{}' not found", quiz_id)))?;

        Ok(quiz)
    }

    pub async fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"SELECT id, title, description, questions, time_limit_minutes,
                      difficulty, tags, created_at, updated_at
               FROM quizzes ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(quizzes)
    }
}
