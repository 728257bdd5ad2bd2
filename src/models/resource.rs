use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Locally curated learning resource, the fallback recommendation source.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resource {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub resource_type: String,
    pub difficulty: String,
    pub rating: Option<f64>,
    pub course_ids: JsonValue,
}
