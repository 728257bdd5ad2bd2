use crate::dto::recommendation_dto::{VideoSearchRequest, VideoSearchResponse};
use crate::error::Result;
use crate::AppState;
use axum::extract::State;
use axum::Json;
use validator::Validate;

#[axum::debug_handler]
pub async fn search_videos(
    State(state): State<AppState>,
    Json(req): Json<VideoSearchRequest>,
) -> Result<Json<VideoSearchResponse>> {
    req.validate()?;

    let recommendations = state
        .video_service
        .search(
            &req.topic,
            req.difficulty.as_deref().unwrap_or("beginner"),
            req.max_results.unwrap_or(5),
            req.category.as_deref(),
        )
        .await?;

    Ok(Json(VideoSearchResponse { recommendations }))
}
