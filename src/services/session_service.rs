use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::quiz::Quiz;
use crate::models::result::QuizResult;
use crate::services::result_service::ResultService;
use crate::services::scoring::{self, UNANSWERED};
use crate::utils::token::generate_session_token;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Submitted,
}

/// One learner's in-memory progress through one quiz. Session-scoped: created
/// when the quiz is opened, discarded on abandon or after retention expires.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub quiz_id: String,
    pub user_id: String,
    pub questions: Vec<Question>,
    pub current_question_index: usize,
    pub answers: Vec<i32>,
    pub time_limit_minutes: i32,
    pub time_left_seconds: i32,
    pub submitted: bool,
    pub status: SessionStatus,
    pub result_id: Option<Uuid>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Attempt {
    pub fn new(quiz: &Quiz, user_id: &str) -> Self {
        let questions = quiz.parsed_questions();
        let answers = vec![UNANSWERED; questions.len()];
        Self {
            quiz_id: quiz.id.clone(),
            user_id: user_id.to_string(),
            questions,
            current_question_index: 0,
            answers,
            time_limit_minutes: quiz.time_limit_minutes,
            time_left_seconds: quiz.time_limit_minutes * 60,
            submitted: false,
            status: SessionStatus::InProgress,
            result_id: None,
            finished_at: None,
        }
    }

    /// No-op once submitted; otherwise records the pick for the current
    /// question. Nothing is persisted until submit.
    pub fn select_answer(&mut self, option_index: i32) -> Result<()> {
        if self.submitted {
            return Ok(());
        }
        let options = self
            .questions
            .get(self.current_question_index)
            .map(|q| q.options.len())
            .unwrap_or(0);
        if option_index < 0 || option_index as usize >= options {
            return Err(Error::BadRequest(format!(
                "Option index {} out of range (question has {} options)",
                option_index, options
            )));
        }
        self.answers[self.current_question_index] = option_index;
        Ok(())
    }

    /// Moving forward requires the current slot to be answered.
    pub fn go_next(&mut self) -> Result<()> {
        if self.answers[self.current_question_index] == UNANSWERED {
            return Err(Error::BadRequest(
                "Answer the current question before moving on".to_string(),
            ));
        }
        if self.current_question_index + 1 < self.questions.len() {
            self.current_question_index += 1;
        }
        Ok(())
    }

    pub fn go_previous(&mut self) {
        self.current_question_index = self.current_question_index.saturating_sub(1);
    }

    /// Direct jumps are unrestricted within bounds.
    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        if index >= self.questions.len() {
            return Err(Error::BadRequest(format!(
                "Question index {} out of range",
                index
            )));
        }
        self.current_question_index = index;
        Ok(())
    }

    /// One countdown second. Returns true when the timer just hit zero.
    pub fn tick(&mut self) -> bool {
        if self.submitted || self.time_left_seconds == 0 {
            return false;
        }
        self.time_left_seconds -= 1;
        self.time_left_seconds == 0
    }

    pub fn all_answered(&self) -> bool {
        self.answers.iter().all(|&a| a != UNANSWERED)
    }

    pub fn time_expired(&self) -> bool {
        self.time_left_seconds == 0
    }

    pub fn can_submit(&self) -> bool {
        !self.submitted && (self.all_answered() || self.time_expired())
    }

    /// Compare-and-set on the submitted flag. Exactly one caller (user or
    /// timer) wins the race; the loser sees false.
    pub fn begin_submit(&mut self) -> bool {
        if self.submitted {
            return false;
        }
        self.submitted = true;
        true
    }

    /// Reverts the flag so a failed persistence call can be retried without
    /// losing local answer state.
    pub fn abort_submit(&mut self) {
        self.submitted = false;
    }

    pub fn complete(&mut self, result_id: Uuid) {
        self.status = SessionStatus::Submitted;
        self.result_id = Some(result_id);
        self.finished_at = Some(Utc::now());
    }

    pub fn time_spent_seconds(&self) -> i32 {
        self.time_limit_minutes * 60 - self.time_left_seconds
    }

    pub fn score(&self) -> i32 {
        scoring::score_answers(&self.questions, &self.answers)
    }
}

/// Session store for the quiz session engine. All attempt mutations happen
/// under one mutex which is never held across an await; persistence runs
/// outside the lock against a snapshot.
#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
    sessions: Arc<Mutex<HashMap<String, Attempt>>>,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn create_session(&self, quiz: &Quiz, user_id: &str) -> Result<(String, Attempt)> {
        let questions = quiz.parsed_questions();
        if questions.is_empty() {
            return Err(Error::BadRequest(format!(
                "Quiz '{}' has no questions",
                quiz.id
            )));
        }
        let attempt = Attempt::new(quiz, user_id);
        let token = generate_session_token(32);
        let mut sessions = self.lock();
        sessions.insert(token.clone(), attempt.clone());
        Ok((token, attempt))
    }

    pub fn get_session(&self, token: &str) -> Result<Attempt> {
        let sessions = self.lock();
        sessions
            .get(token)
            .cloned()
            .ok_or_else(|| Error::NotFound("Session not found".to_string()))
    }

    pub fn select_answer(&self, token: &str, option_index: i32) -> Result<Attempt> {
        self.with_session(token, |attempt| {
            attempt.select_answer(option_index)?;
            Ok(attempt.clone())
        })
    }

    pub fn navigate(&self, token: &str, nav: Navigation) -> Result<Attempt> {
        self.with_session(token, |attempt| {
            if attempt.submitted {
                return Err(Error::BadRequest(
                    "Session has already been submitted".to_string(),
                ));
            }
            match nav {
                Navigation::Next => attempt.go_next()?,
                Navigation::Previous => attempt.go_previous(),
                Navigation::Jump(index) => attempt.jump_to(index)?,
            }
            Ok(attempt.clone())
        })
    }

    /// Submits the attempt and persists the result. Idempotent with the
    /// timer-forced submit: the submitted flag is checked-and-set under the
    /// lock before any await, so at most one result row is created.
    pub async fn submit(&self, token: &str) -> Result<(QuizResult, Vec<Question>, Attempt)> {
        let snapshot = {
            let mut sessions = self.lock();
            let attempt = sessions
                .get_mut(token)
                .ok_or_else(|| Error::NotFound("Session not found".to_string()))?;

            if attempt.status == SessionStatus::Submitted {
                // Repeated submit after success is answered from stored state.
                attempt.clone()
            } else {
                if !attempt.can_submit() {
                    if attempt.submitted {
                        return Err(Error::BadRequest(
                            "Submission already in progress".to_string(),
                        ));
                    }
                    return Err(Error::BadRequest(
                        "All questions must be answered before submitting".to_string(),
                    ));
                }
                if !attempt.begin_submit() {
                    return Err(Error::BadRequest(
                        "Submission already in progress".to_string(),
                    ));
                }
                attempt.clone()
            }
        };

        if let Some(result_id) = snapshot.result_id {
            let (result, quiz) = ResultService::new(self.pool.clone())
                .get_result(result_id)
                .await?;
            return Ok((result, quiz.parsed_questions(), snapshot));
        }

        let persisted = ResultService::new(self.pool.clone())
            .create_result(
                &snapshot.quiz_id,
                &snapshot.answers,
                snapshot.time_spent_seconds(),
                &snapshot.user_id,
            )
            .await;

        let mut sessions = self.lock();
        let attempt = sessions
            .get_mut(token)
            .ok_or_else(|| Error::NotFound("Session not found".to_string()))?;

        match persisted {
            Ok(result) => {
                attempt.complete(result.id);
                Ok((result, attempt.questions.clone(), attempt.clone()))
            }
            Err(e) => {
                // Submission is retryable; local answers are preserved.
                attempt.abort_submit();
                Err(e)
            }
        }
    }

    /// Abandons the session: the countdown stops and no partial result is
    /// persisted.
    pub fn abandon(&self, token: &str) -> Result<()> {
        let mut sessions = self.lock();
        sessions
            .remove(token)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound("Session not found".to_string()))
    }

    /// One sweeper pass: decrements every in-progress countdown, then
    /// force-submits attempts whose timer just ran out (partial answers
    /// allowed). Submitted sessions past the retention window are dropped.
    pub async fn tick_once(&self, retention_secs: i64) {
        let expired: Vec<String> = {
            let mut sessions = self.lock();
            let now = Utc::now();
            sessions.retain(|_, attempt| match attempt.finished_at {
                Some(done) => (now - done).num_seconds() < retention_secs,
                None => true,
            });
            sessions
                .iter_mut()
                .filter_map(|(token, attempt)| {
                    let hit_zero = attempt.tick();
                    // Also retry attempts stuck at zero from a failed forced
                    // submit on a previous pass.
                    if hit_zero || (attempt.time_expired() && !attempt.submitted) {
                        Some(token.clone())
                    } else {
                        None
                    }
                })
                .collect()
        };

        for token in expired {
            match self.submit(&token).await {
                Ok((result, _, _)) => {
                    tracing::info!(
                        "Timer expired: force-submitted session, result={} score={}/{}",
                        result.id,
                        result.score,
                        result.total_questions
                    );
                }
                Err(e) => {
                    tracing::warn!("Forced submit failed, will retry next tick: {:?}", e);
                }
            }
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.lock().len()
    }

    fn with_session<T>(
        &self,
        token: &str,
        f: impl FnOnce(&mut Attempt) -> Result<T>,
    ) -> Result<T> {
        let mut sessions = self.lock();
        let attempt = sessions
            .get_mut(token)
            .ok_or_else(|| Error::NotFound("Session not found".to_string()))?;
        f(attempt)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Attempt>> {
        self.sessions.lock().expect("session store mutex poisoned")
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Navigation {
    Next,
    Previous,
    Jump(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quiz(num_questions: usize, time_limit_minutes: i32) -> Quiz {
        let questions: Vec<serde_json::Value> = (0..num_questions)
            .map(|i| {
                json!({
                    "id": i + 1,
                    "text": format!("Question {}", i + 1),
                    "options": ["a", "b", "c"],
                    "correct_answer": (i % 3).to_string(),
                    "explanation": null
                })
            })
            .collect();
        Quiz {
            id: "intro-to-cs".into(),
            title: "Intro".into(),
            description: None,
            questions: json!(questions),
            time_limit_minutes,
            difficulty: "beginner".into(),
            tags: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn new_attempt_starts_unanswered_with_full_budget() {
        let attempt = Attempt::new(&quiz(3, 15), "learner");
        assert_eq!(attempt.answers, vec![-1, -1, -1]);
        assert_eq!(attempt.current_question_index, 0);
        assert_eq!(attempt.time_left_seconds, 900);
        assert!(!attempt.submitted);
    }

    #[test]
    fn select_answer_rejects_out_of_range() {
        let mut attempt = Attempt::new(&quiz(2, 5), "learner");
        assert!(attempt.select_answer(3).is_err());
        assert!(attempt.select_answer(-1).is_err());
        attempt.select_answer(1).unwrap();
        assert_eq!(attempt.answers[0], 1);
    }

    #[test]
    fn select_answer_is_noop_after_submit() {
        let mut attempt = Attempt::new(&quiz(1, 5), "learner");
        attempt.select_answer(0).unwrap();
        assert!(attempt.begin_submit());
        attempt.select_answer(2).unwrap();
        assert_eq!(attempt.answers[0], 0);
    }

    #[test]
    fn next_requires_current_slot_answered() {
        let mut attempt = Attempt::new(&quiz(3, 5), "learner");
        assert!(attempt.go_next().is_err());
        attempt.select_answer(0).unwrap();
        attempt.go_next().unwrap();
        assert_eq!(attempt.current_question_index, 1);
    }

    #[test]
    fn previous_clamps_at_zero_and_jump_is_unrestricted() {
        let mut attempt = Attempt::new(&quiz(3, 5), "learner");
        attempt.go_previous();
        assert_eq!(attempt.current_question_index, 0);
        attempt.jump_to(2).unwrap();
        assert_eq!(attempt.current_question_index, 2);
        assert!(attempt.jump_to(3).is_err());
    }

    #[test]
    fn next_clamps_at_last_question() {
        let mut attempt = Attempt::new(&quiz(2, 5), "learner");
        attempt.jump_to(1).unwrap();
        attempt.select_answer(0).unwrap();
        attempt.go_next().unwrap();
        assert_eq!(attempt.current_question_index, 1);
    }

    #[test]
    fn scoring_counts_exact_matches_only() {
        // correct answers are "0", "1", "2"
        let mut attempt = Attempt::new(&quiz(3, 5), "learner");
        attempt.answers = vec![0, 1, 2];
        assert_eq!(attempt.score(), 3);
        attempt.answers = vec![0, -1, 1];
        assert_eq!(attempt.score(), 1);
    }

    #[test]
    fn submit_gate_requires_all_answered_or_expired_timer() {
        let mut attempt = Attempt::new(&quiz(2, 1), "learner");
        assert!(!attempt.can_submit());
        attempt.select_answer(0).unwrap();
        assert!(!attempt.can_submit());

        // Timer expiry unlocks submission with partial answers.
        for _ in 0..60 {
            attempt.tick();
        }
        assert!(attempt.time_expired());
        assert!(attempt.can_submit());
        assert_eq!(attempt.answers[1], -1);
        assert_eq!(attempt.score(), 1);
    }

    #[test]
    fn begin_submit_resolves_the_timer_race_to_one_winner() {
        let mut attempt = Attempt::new(&quiz(1, 5), "learner");
        attempt.select_answer(0).unwrap();
        assert!(attempt.begin_submit());
        assert!(!attempt.begin_submit());
        attempt.abort_submit();
        assert!(attempt.begin_submit());
    }

    #[test]
    fn tick_stops_at_zero_and_after_submit() {
        let mut attempt = Attempt::new(&quiz(1, 1), "learner");
        let mut hit_zero = 0;
        for _ in 0..120 {
            if attempt.tick() {
                hit_zero += 1;
            }
        }
        assert_eq!(attempt.time_left_seconds, 0);
        assert_eq!(hit_zero, 1);

        let mut submitted = Attempt::new(&quiz(1, 1), "learner");
        submitted.begin_submit();
        assert!(!submitted.tick());
        assert_eq!(submitted.time_left_seconds, 60);
    }

    #[test]
    fn time_spent_is_budget_minus_remaining() {
        let mut attempt = Attempt::new(&quiz(1, 15), "learner");
        for _ in 0..600 {
            attempt.tick();
        }
        assert_eq!(attempt.time_spent_seconds(), 600);
    }

    fn lazy_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/learnhub_test")
            .expect("lazy pool")
    }

    #[tokio::test]
    async fn session_store_roundtrip_and_abandon() {
        let svc = SessionService::new(lazy_pool());
        let (token, _) = svc.create_session(&quiz(2, 5), "learner").unwrap();
        assert_eq!(svc.active_sessions(), 1);

        let state = svc.get_session(&token).unwrap();
        assert_eq!(state.quiz_id, "intro-to-cs");

        svc.select_answer(&token, 1).unwrap();
        let state = svc.navigate(&token, Navigation::Next).unwrap();
        assert_eq!(state.current_question_index, 1);

        svc.abandon(&token).unwrap();
        assert_eq!(svc.active_sessions(), 0);
        assert!(svc.get_session(&token).is_err());
    }

    #[tokio::test]
    async fn create_session_rejects_empty_quiz() {
        let svc = SessionService::new(lazy_pool());
        assert!(svc.create_session(&quiz(0, 5), "learner").is_err());
    }
}
