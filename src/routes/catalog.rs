use crate::dto::recommendation_dto::CourseSummary;
use crate::models::catalog::Catalog;
use crate::AppState;
use axum::extract::State;
use axum::Json;

#[axum::debug_handler]
pub async fn get_catalog(State(state): State<AppState>) -> Json<Catalog> {
    Json((*state.catalog).clone())
}

/// Flattened course list with denormalized program/year/semester, handy for
/// course pickers.
#[axum::debug_handler]
pub async fn list_courses(State(state): State<AppState>) -> Json<Vec<CourseSummary>> {
    let courses = state
        .catalog
        .all_courses()
        .iter()
        .map(CourseSummary::from_course_ref)
        .collect();
    Json(courses)
}
