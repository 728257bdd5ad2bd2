use crate::models::question::Question;
use crate::models::recommendation::{
    CourseRecommendation, DifficultyLevel, PerformanceSample, PerformanceSummary,
};

/// Unanswered slot marker in an attempt's answer array.
pub const UNANSWERED: i32 = -1;

/// Counts positions where the selected option index equals the parsed
/// `correct_answer` index. No partial credit; an unanswered slot (-1) or an
/// unparseable stored answer never matches.
pub fn score_answers(questions: &[Question], answers: &[i32]) -> i32 {
    questions
        .iter()
        .zip(answers.iter())
        .filter(|(q, &a)| a >= 0 && q.correct_index() == Some(a as i64))
        .count() as i32
}

pub fn percentage(score: i64, total: i64) -> i32 {
    if total <= 0 {
        return 0;
    }
    ((100.0 * score as f64 / total as f64).round()) as i32
}

/// Sums all history entries for the given course (quiz id == course id by
/// convention). Zero matching entries means performance is absent, which is a
/// distinct branch from a 0% performance.
pub fn aggregate_performance(
    course_id: &str,
    samples: &[PerformanceSample],
) -> Option<PerformanceSummary> {
    let matching: Vec<&PerformanceSample> = samples
        .iter()
        .filter(|s| s.quiz_id == course_id)
        .collect();
    if matching.is_empty() {
        return None;
    }
    let score: i64 = matching.iter().map(|s| s.score as i64).sum();
    let total: i64 = matching.iter().map(|s| s.total_questions as i64).sum();
    Some(PerformanceSummary {
        score: score as i32,
        total_questions: total as i32,
        percentage: percentage(score, total),
    })
}

/// Difficulty classification and priority assignment. Courses the learner
/// struggles with surface first; mastered or not-yet-attempted courses rank
/// lower, with year-1 unattempted courses ahead of upper-year ones.
pub fn classify(performance: Option<&PerformanceSummary>, year: i32) -> (DifficultyLevel, i32) {
    match performance {
        Some(perf) => {
            if perf.percentage < 40 {
                (DifficultyLevel::Beginner, 5)
            } else if perf.percentage > 80 {
                (DifficultyLevel::Advanced, 2)
            } else {
                (DifficultyLevel::Intermediate, 3)
            }
        }
        None => {
            if year <= 1 {
                (DifficultyLevel::Beginner, 4)
            } else if year >= 3 {
                (DifficultyLevel::Advanced, 2)
            } else {
                (DifficultyLevel::Intermediate, 3)
            }
        }
    }
}

/// Priority descending, then year ascending. The sort is stable, so courses
/// equal on both keys keep catalog-encounter order.
pub fn sort_by_priority(recommendations: &mut [CourseRecommendation]) {
    recommendations.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.year.cmp(&b.year))
    });
}
