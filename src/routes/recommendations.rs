use crate::dto::recommendation_dto::{
    CourseSpecificResponse, FilteredResponse, GeneralResponse, RecommendationMode,
    RecommendationRequest,
};
use crate::error::Result;
use crate::services::ai_service::parse_numbered_recommendations;
use crate::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// One endpoint, three modes. Mode selection is by field presence, see
/// `RecommendationRequest::mode`.
#[axum::debug_handler]
pub async fn recommend(
    State(state): State<AppState>,
    Json(req): Json<RecommendationRequest>,
) -> Result<Response> {
    match req.mode() {
        RecommendationMode::CourseSpecific => {
            let course_id = req.course_id.as_deref().unwrap_or_default();
            let bundle = state
                .recommendation_service
                .course_recommendations(course_id, &req.quiz_results)
                .await?;
            Ok(Json(CourseSpecificResponse {
                recommendations: bundle.recommendations,
                course: bundle.course,
                performance: bundle.performance,
            })
            .into_response())
        }
        RecommendationMode::Filtered => {
            let course_recommendations = state
                .recommendation_service
                .filtered_recommendations(
                    RecommendationRequest::selected_or_all(&req.selected_program),
                    RecommendationRequest::selected_or_all(&req.selected_year),
                    RecommendationRequest::selected_or_all(&req.selected_semester),
                    &req.quiz_results,
                )
                .await?;
            Ok(Json(FilteredResponse {
                course_recommendations,
            })
            .into_response())
        }
        RecommendationMode::General => {
            let prompt = state.ai_service.general_prompt(
                req.program.as_deref().unwrap_or("unspecified"),
                &req.interests,
                &req.recent_topics,
                &req.quiz_results,
            );
            let raw_response = state.ai_service.generate_text(&prompt).await?;
            let recommendations = parse_numbered_recommendations(&raw_response);
            Ok(Json(GeneralResponse {
                recommendations,
                raw_response,
            })
            .into_response())
        }
    }
}
