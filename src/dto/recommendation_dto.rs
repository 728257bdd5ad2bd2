use crate::models::catalog::CourseRef;
use crate::models::recommendation::{
    CourseRecommendation, PerformanceSample, PerformanceSummary, RecommendationItem, VideoItem,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body of the recommendation endpoint. Which mode runs is decided by
/// field presence, checked in order: `course_id` -> course-specific; any of
/// the `selected_*` filters not "all" -> filtered; otherwise general.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub course_id: Option<String>,
    pub selected_program: Option<String>,
    pub selected_year: Option<String>,
    pub selected_semester: Option<String>,
    pub program: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub recent_topics: Vec<String>,
    #[serde(default)]
    pub quiz_results: Vec<PerformanceSample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationMode {
    CourseSpecific,
    Filtered,
    General,
}

impl RecommendationRequest {
    pub fn mode(&self) -> RecommendationMode {
        if self.course_id.is_some() {
            return RecommendationMode::CourseSpecific;
        }
        let filtered = [
            &self.selected_program,
            &self.selected_year,
            &self.selected_semester,
        ]
        .iter()
        .any(|f| matches!(f, Some(v) if !v.eq_ignore_ascii_case("all")));
        if filtered {
            RecommendationMode::Filtered
        } else {
            RecommendationMode::General
        }
    }

    pub fn selected_or_all(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or("all")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub program_title: String,
    pub year: i32,
    pub semester: i32,
}

impl CourseSummary {
    pub fn from_course_ref(cref: &CourseRef<'_>) -> Self {
        Self {
            id: cref.course.id.clone(),
            title: cref.course.title.clone(),
            description: cref.course.description.clone(),
            program_title: cref.program.title.clone(),
            year: cref.year,
            semester: cref.semester,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSpecificResponse {
    pub recommendations: Vec<RecommendationItem>,
    pub course: CourseSummary,
    pub performance: Option<PerformanceSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredResponse {
    pub course_recommendations: Vec<CourseRecommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralResponse {
    pub recommendations: Vec<RecommendationItem>,
    pub raw_response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VideoSearchRequest {
    #[validate(length(min = 1))]
    pub topic: String,
    pub difficulty: Option<String>,
    pub max_results: Option<u8>,
    #[serde(rename = "type")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSearchResponse {
    pub recommendations: Vec<VideoItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_selection_checks_course_id_first() {
        let req = RecommendationRequest {
            course_id: Some("intro-to-cs".into()),
            selected_program: Some("cs".into()),
            ..Default::default()
        };
        assert_eq!(req.mode(), RecommendationMode::CourseSpecific);
    }

    #[test]
    fn all_sentinels_fall_through_to_general() {
        let req = RecommendationRequest {
            selected_program: Some("all".into()),
            selected_year: Some("ALL".into()),
            ..Default::default()
        };
        assert_eq!(req.mode(), RecommendationMode::General);

        let req = RecommendationRequest::default();
        assert_eq!(req.mode(), RecommendationMode::General);
    }

    #[test]
    fn any_concrete_filter_selects_filtered_mode() {
        let req = RecommendationRequest {
            selected_year: Some("2".into()),
            ..Default::default()
        };
        assert_eq!(req.mode(), RecommendationMode::Filtered);
    }
}
