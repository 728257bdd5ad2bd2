pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::models::catalog::Catalog;
use crate::services::ai_service::AIService;
use crate::services::recommendation_service::{BlendedContentSource, RecommendationService};
use crate::services::session_service::SessionService;
use crate::services::video_service::VideoService;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub catalog: Arc<Catalog>,
    pub session_service: SessionService,
    pub ai_service: AIService,
    pub video_service: VideoService,
    pub recommendation_service: RecommendationService,
}

impl AppState {
    pub fn new(pool: PgPool, catalog: Catalog, config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.content_timeout_secs);
        // One shared HTTP client; per-request timeouts bound every outbound
        // provider call.
        let client = reqwest::Client::builder().build()?;

        let catalog = Arc::new(catalog);
        let ai_service = AIService::new(config.openai_api_key.clone(), client.clone(), timeout);
        let video_service = VideoService::new(config.youtube_api_key.clone(), client, timeout);
        let content_source = Arc::new(BlendedContentSource::new(
            ai_service.clone(),
            video_service.clone(),
        ));
        let recommendation_service =
            RecommendationService::new(catalog.clone(), pool.clone(), content_source);

        Ok(Self {
            session_service: SessionService::new(pool.clone()),
            pool,
            catalog,
            ai_service,
            video_service,
            recommendation_service,
        })
    }
}
