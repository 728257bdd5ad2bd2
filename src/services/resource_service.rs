use crate::error::Result;
use crate::models::resource::Resource;
use serde_json::json;
use sqlx::PgPool;

#[derive(Clone)]
pub struct ResourceService {
    pool: PgPool,
}

impl ResourceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resources whose `course_ids` array contains the given course.
    pub async fn list_resources_for_course(&self, course_id: &str) -> Result<Vec<Resource>> {
        let resources = sqlx::query_as::<_, Resource>(
            r#"SELECT id, title, description, url, resource_type, difficulty, rating, course_ids
               FROM resources
               WHERE course_ids @> $1
               ORDER BY rating DESC NULLS LAST"#,
        )
        .bind(json!([course_id]))
        .fetch_all(&self.pool)
        .await?;
        Ok(resources)
    }
}
