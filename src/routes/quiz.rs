use crate::dto::quiz_dto::PublicQuizView;
use crate::error::Result;
use crate::services::quiz_service::QuizService;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;

#[axum::debug_handler]
pub async fn list_quizzes(State(state): State<AppState>) -> Result<Json<Vec<PublicQuizView>>> {
    let quizzes = QuizService::new(state.pool.clone()).list_quizzes().await?;
    Ok(Json(quizzes.iter().map(PublicQuizView::from_quiz).collect()))
}

#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<PublicQuizView>> {
    let quiz = QuizService::new(state.pool.clone()).get_quiz(&quiz_id).await?;
    Ok(Json(PublicQuizView::from_quiz(&quiz)))
}
