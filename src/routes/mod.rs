use crate::middleware::auth::require_bearer_auth;
use crate::middleware::rate_limit::{new_rps_state, rps_middleware};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;

pub mod catalog;
pub mod health;
pub mod quiz;
pub mod recommendations;
pub mod results;
pub mod session;
pub mod videos;

/// Full application router. Catalog and quiz listings are public; everything
/// touching a learner's sessions, results, or recommendations requires a
/// bearer token and shares one rate-limit budget.
pub fn build_router(state: AppState, rps: u32) -> Router {
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/catalog", get(catalog::get_catalog))
        .route("/api/catalog/courses", get(catalog::list_courses))
        .route("/api/quizzes", get(quiz::list_quizzes))
        .route("/api/quizzes/:quiz_id", get(quiz::get_quiz));

    let learner = Router::new()
        .route("/api/sessions", post(session::create_session))
        .route(
            "/api/sessions/:token",
            get(session::get_session).delete(session::abandon_session),
        )
        .route("/api/sessions/:token/answer", post(session::select_answer))
        .route("/api/sessions/:token/navigate", post(session::navigate))
        .route("/api/sessions/:token/submit", post(session::submit_session))
        .route("/api/results", get(results::list_results))
        .route("/api/results/:result_id", get(results::get_result))
        .route("/api/recommendations", post(recommendations::recommend))
        .route("/api/videos/search", post(videos::search_videos))
        .layer(axum::middleware::from_fn(require_bearer_auth))
        .layer(axum::middleware::from_fn_with_state(
            new_rps_state(rps),
            rps_middleware,
        ));

    public.merge(learner).with_state(state)
}
