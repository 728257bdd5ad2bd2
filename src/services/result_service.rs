use crate::error::{Error, Result};
use crate::models::quiz::Quiz;
use crate::models::result::QuizResult;
use crate::services::quiz_service::QuizService;
use crate::services::scoring;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ResultService {
    pool: PgPool,
}

impl ResultService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the immutable result row for a submitted attempt. The score is
    /// computed here from the quiz's questions, never trusted from the client.
    pub async fn create_result(
        &self,
        quiz_id: &str,
        answers: &[i32],
        time_spent_seconds: i32,
        user_id: &str,
    ) -> Result<QuizResult> {
        let quiz = QuizService::new(self.pool.clone()).get_quiz(quiz_id).await?;
        let questions = quiz.parsed_questions();

        validate_answer_shape(questions.len(), answers)?;

        let score = scoring::score_answers(&questions, answers);
        let answers_json = serde_json::to_value(answers)?;

        let result = sqlx::query_as::<_, QuizResult>(
            r#"
            INSERT INTO results (id, quiz_id, user_id, score, total_questions, time_spent_seconds, answers, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING id, quiz_id, user_id, score, total_questions, time_spent_seconds, answers, submitted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(quiz_id)
        .bind(user_id)
        .bind(score)
        .bind(questions.len() as i32)
        .bind(time_spent_seconds)
        .bind(answers_json)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    /// Fetches a result joined with its quiz so the caller can render the
    /// per-question review.
    pub async fn get_result(&self, result_id: Uuid) -> Result<(QuizResult, Quiz)> {
        let result = sqlx::query_as::<_, QuizResult>(
            r#"SELECT id, quiz_id, user_id, score, total_questions, time_spent_seconds, answers, submitted_at
               FROM results WHERE id = $1"#,
        )
        .bind(result_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Result '{}' not found", result_id)))?;

        let quiz = QuizService::new(self.pool.clone())
            .get_quiz(&result.quiz_id)
            .await?;

        Ok((result, quiz))
    }

    pub async fn list_results_for_user(&self, user_id: &str) -> Result<Vec<QuizResult>> {
        let results = sqlx::query_as::<_, QuizResult>(
            r#"SELECT id, quiz_id, user_id, score, total_questions, time_spent_seconds, answers, submitted_at
               FROM results WHERE user_id = $1
               ORDER BY submitted_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(results)
    }
}

/// Shape check for a submitted answer array: one slot per question, each
/// either -1 (unanswered) or a non-negative option index. Rejected payloads
/// never reach the insert, so the caller's local state stays correctable.
pub fn validate_answer_shape(expected_len: usize, answers: &[i32]) -> Result<()> {
    if answers.len() != expected_len {
        return Err(Error::BadRequest(format!(
            "Expected {} answers, got {}",
            expected_len,
            answers.len()
        )));
    }
    if answers.iter().any(|&a| a < scoring::UNANSWERED) {
        return Err(Error::BadRequest(
            "Answer indices must be -1 (unanswered) or a non-negative option index".to_string(),
        ));
    }
    Ok(())
}
