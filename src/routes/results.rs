use crate::dto::quiz_dto::{build_review, ResultDetailResponse, ResultSummary};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::services::result_service::ResultService;
use crate::AppState;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

#[axum::debug_handler]
pub async fn list_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ResultSummary>>> {
    let results = ResultService::new(state.pool.clone())
        .list_results_for_user(&claims.sub)
        .await?;

    Ok(Json(
        results
            .into_iter()
            .map(|r| ResultSummary {
                id: r.id,
                quiz_id: r.quiz_id,
                score: r.score,
                total_questions: r.total_questions,
                time_spent_seconds: r.time_spent_seconds,
                submitted_at: r.submitted_at,
            })
            .collect(),
    ))
}

#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(result_id): Path<Uuid>,
) -> Result<Json<ResultDetailResponse>> {
    let (result, quiz) = ResultService::new(state.pool.clone())
        .get_result(result_id)
        .await?;
    if result.user_id != claims.sub {
        return Err(Error::NotFound(format!("Result '{}' not found", result_id)));
    }

    let questions = quiz.parsed_questions();
    let answers = result.parsed_answers();
    let review = build_review(&questions, &answers);

    Ok(Json(ResultDetailResponse {
        id: result.id,
        quiz_id: result.quiz_id,
        quiz_title: quiz.title,
        score: result.score,
        total_questions: result.total_questions,
        time_spent_seconds: result.time_spent_seconds,
        answers,
        submitted_at: result.submitted_at,
        review,
    }))
}
