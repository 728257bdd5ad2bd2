use crate::models::question::Question;
use crate::models::quiz::Quiz;
use crate::services::session_service::{Attempt, SessionStatus};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Learner-facing question view: correct answer and explanation stripped
/// until submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestionView {
    pub id: i32,
    pub text: String,
    pub options: Vec<String>,
}

impl PublicQuestionView {
    pub fn from_question(q: &Question) -> Self {
        Self {
            id: q.id,
            text: q.text.clone(),
            options: q.options.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuizView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: i32,
    pub difficulty: String,
    pub total_questions: usize,
    pub questions: Vec<PublicQuestionView>,
}

impl PublicQuizView {
    pub fn from_quiz(quiz: &Quiz) -> Self {
        let questions: Vec<PublicQuestionView> = quiz
            .parsed_questions()
            .iter()
            .map(PublicQuestionView::from_question)
            .collect();
        Self {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            time_limit_minutes: quiz.time_limit_minutes,
            difficulty: quiz.difficulty.clone(),
            total_questions: questions.len(),
            questions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1))]
    pub quiz_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub token: String,
    pub quiz: PublicQuizView,
    pub current_question_index: usize,
    pub time_left_seconds: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStateResponse {
    pub quiz_id: String,
    pub status: SessionStatus,
    pub current_question_index: usize,
    pub answers: Vec<i32>,
    pub answered_count: usize,
    pub total_questions: usize,
    pub time_left_seconds: i32,
    pub submitted: bool,
}

impl SessionStateResponse {
    pub fn from_attempt(attempt: &Attempt) -> Self {
        Self {
            quiz_id: attempt.quiz_id.clone(),
            status: attempt.status,
            current_question_index: attempt.current_question_index,
            answered_count: attempt.answers.iter().filter(|&&a| a >= 0).count(),
            total_questions: attempt.questions.len(),
            answers: attempt.answers.clone(),
            time_left_seconds: attempt.time_left_seconds,
            submitted: attempt.submitted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SelectAnswerRequest {
    #[validate(range(min = 0))]
    pub option_index: i32,
}

/// Either an `action` ("next" / "previous") or a direct question `index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigateRequest {
    pub action: Option<String>,
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionReview {
    pub id: i32,
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: Option<i64>,
    pub selected_index: i32,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

pub fn build_review(questions: &[Question], answers: &[i32]) -> Vec<QuestionReview> {
    questions
        .iter()
        .zip(answers.iter())
        .map(|(q, &selected)| {
            let correct_index = q.correct_index();
            QuestionReview {
                id: q.id,
                text: q.text.clone(),
                options: q.options.clone(),
                correct_index,
                selected_index: selected,
                is_correct: selected >= 0 && correct_index == Some(selected as i64),
                explanation: q.explanation.clone(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitSessionResponse {
    pub result_id: uuid::Uuid,
    pub quiz_id: String,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub time_spent_seconds: i32,
    pub review: Vec<QuestionReview>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub id: uuid::Uuid,
    pub quiz_id: String,
    pub score: i32,
    pub total_questions: i32,
    pub time_spent_seconds: i32,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDetailResponse {
    pub id: uuid::Uuid,
    pub quiz_id: String,
    pub quiz_title: String,
    pub score: i32,
    pub total_questions: i32,
    pub time_spent_seconds: i32,
    pub answers: Vec<i32>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub review: Vec<QuestionReview>,
}
