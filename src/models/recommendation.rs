use crate::models::resource::Resource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    /// Capitalized form used for recommendation item labels.
    pub fn label(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "Beginner",
            DifficultyLevel::Intermediate => "Intermediate",
            DifficultyLevel::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        };
        f.write_str(label)
    }
}

/// One entry of a learner's quiz-performance history. Comes either from the
/// persisted `results` table or from the history the client sends along with
/// a recommendation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    pub quiz_id: String,
    pub score: i32,
    pub total_questions: i32,
}

/// Aggregated performance for one course. Absent entirely when the learner
/// has no results for the course; that is a different branch from 0%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
}

/// Common projection over the three recommendation sources (curated resource,
/// AI-parsed item, video search hit). Constructed only through the explicit
/// mapping functions below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub difficulty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl RecommendationItem {
    pub fn from_resource(resource: &Resource, reason: String) -> Self {
        Self {
            title: resource.title.clone(),
            description: resource.description.clone(),
            url: resource.url.clone(),
            resource_type: resource.resource_type.clone(),
            difficulty: resource.difficulty.clone(),
            reason: Some(reason),
            platform: None,
            rating: resource.rating,
        }
    }

    pub fn from_parsed(
        title: String,
        description: Option<String>,
        url: String,
        resource_type: String,
        difficulty: String,
    ) -> Self {
        Self {
            title,
            description,
            url,
            resource_type,
            difficulty,
            reason: None,
            platform: None,
            rating: None,
        }
    }

    pub fn from_video(video: &VideoItem, difficulty: &str) -> Self {
        Self {
            title: video.title.clone(),
            description: Some(format!("Video by {}", video.channel)),
            url: video.url.clone(),
            resource_type: "Video".to_string(),
            difficulty: difficulty.to_string(),
            reason: None,
            platform: Some("youtube".to_string()),
            rating: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub title: String,
    pub channel: String,
    pub duration: Option<String>,
    pub thumbnail: Option<String>,
    pub url: String,
}

/// Derived, per-course recommendation bundle. Recomputed on every aggregation
/// request; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecommendation {
    pub course_id: String,
    pub course_title: String,
    pub program_title: String,
    pub year: i32,
    pub semester: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceSummary>,
    pub difficulty: DifficultyLevel,
    pub priority: i32,
    pub recommendations: Vec<RecommendationItem>,
}
