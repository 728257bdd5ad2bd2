use crate::dto::quiz_dto::{
    build_review, CreateSessionRequest, CreateSessionResponse, NavigateRequest, PublicQuizView,
    SelectAnswerRequest, SessionStateResponse, SubmitSessionResponse,
};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::services::quiz_service::QuizService;
use crate::services::scoring;
use crate::services::session_service::{Attempt, Navigation};
use crate::AppState;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde_json::{json, Value};
use validator::Validate;

/// Sessions are keyed by an unguessable token, but tokens are still bound to
/// the learner who opened them.
fn ensure_owner(attempt: &Attempt, claims: &Claims) -> Result<()> {
    if attempt.user_id != claims.sub {
        return Err(Error::NotFound("Session not found".to_string()));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>> {
    req.validate()?;

    let quiz = QuizService::new(state.pool.clone())
        .get_quiz(&req.quiz_id)
        .await?;
    let (token, attempt) = state.session_service.create_session(&quiz, &claims.sub)?;

    tracing::info!("Session opened for quiz '{}' by '{}'", quiz.id, claims.sub);
    Ok(Json(CreateSessionResponse {
        token,
        quiz: PublicQuizView::from_quiz(&quiz),
        current_question_index: attempt.current_question_index,
        time_left_seconds: attempt.time_left_seconds,
    }))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(token): Path<String>,
) -> Result<Json<SessionStateResponse>> {
    let attempt = state.session_service.get_session(&token)?;
    ensure_owner(&attempt, &claims)?;
    Ok(Json(SessionStateResponse::from_attempt(&attempt)))
}

#[axum::debug_handler]
pub async fn select_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(token): Path<String>,
    Json(req): Json<SelectAnswerRequest>,
) -> Result<Json<SessionStateResponse>> {
    req.validate()?;
    let attempt = state.session_service.get_session(&token)?;
    ensure_owner(&attempt, &claims)?;

    let attempt = state.session_service.select_answer(&token, req.option_index)?;
    Ok(Json(SessionStateResponse::from_attempt(&attempt)))
}

#[axum::debug_handler]
pub async fn navigate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(token): Path<String>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<SessionStateResponse>> {
    let attempt = state.session_service.get_session(&token)?;
    ensure_owner(&attempt, &claims)?;

    let nav = if let Some(index) = req.index {
        Navigation::Jump(index)
    } else {
        match req.action.as_deref() {
            Some("next") => Navigation::Next,
            Some("previous") => Navigation::Previous,
            other => {
                return Err(Error::BadRequest(format!(
                    "Unknown navigation action: {:?}",
                    other
                )))
            }
        }
    };

    let attempt = state.session_service.navigate(&token, nav)?;
    Ok(Json(SessionStateResponse::from_attempt(&attempt)))
}

#[axum::debug_handler]
pub async fn submit_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(token): Path<String>,
) -> Result<Json<SubmitSessionResponse>> {
    let attempt = state.session_service.get_session(&token)?;
    ensure_owner(&attempt, &claims)?;

    let (result, questions, attempt) = state.session_service.submit(&token).await?;
    let review = build_review(&questions, &attempt.answers);

    Ok(Json(SubmitSessionResponse {
        result_id: result.id,
        quiz_id: result.quiz_id,
        score: result.score,
        total_questions: result.total_questions,
        percentage: scoring::percentage(result.score as i64, result.total_questions as i64),
        time_spent_seconds: result.time_spent_seconds,
        review,
    }))
}

#[axum::debug_handler]
pub async fn abandon_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(token): Path<String>,
) -> Result<Json<Value>> {
    let attempt = state.session_service.get_session(&token)?;
    ensure_owner(&attempt, &claims)?;

    state.session_service.abandon(&token)?;
    Ok(Json(json!({"status": "abandoned"})))
}
