use crate::error::{Error, Result};
use crate::models::recommendation::{DifficultyLevel, PerformanceSample, RecommendationItem};
use regex::Regex;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Clone)]
pub struct AIService {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl AIService {
    pub fn new(api_key: String, client: Client, timeout: Duration) -> Self {
        Self {
            client,
            api_key,
            timeout,
        }
    }

    /// Free-text completion. The model is asked for a numbered list; the
    /// response is parsed with `parse_numbered_recommendations`, never
    /// deserialized as JSON.
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let payload = serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [
                {
                    "role": "system",
                    "content": "You are a study advisor for university students. \
                        Reply with a numbered list of learning resources. For each item put \
                        the title on the first line, a one-sentence description on the second \
                        line, and optionally lines starting with 'Type:' and 'Difficulty:' \
                        plus a URL."
                },
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.7
        });

        let res = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("AI provider unreachable: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "AI provider error {}: {}",
                status, text
            )));
        }

        let body: JsonValue = res
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("AI provider returned bad body: {}", e)))?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Upstream("Invalid AI provider response format".to_string()))
    }

    /// Prompt seeded with one course's quiz performance.
    pub fn course_prompt(
        &self,
        quiz_id: &str,
        course_title: &str,
        difficulty: DifficultyLevel,
        score: i32,
        total_questions: i32,
    ) -> String {
        format!(
            "A student scored {}/{} on the '{}' quiz (course: {}). Recommend 3 {} level \
             learning resources that target the gaps this score suggests.",
            score, total_questions, quiz_id, course_title, difficulty
        )
    }

    /// Prompt for the general recommendation mode, interpolating the
    /// learner's program, interests, recent topics, and quiz history.
    pub fn general_prompt(
        &self,
        program: &str,
        interests: &[String],
        recent_topics: &[String],
        quiz_results: &[PerformanceSample],
    ) -> String {
        let history: Vec<String> = quiz_results
            .iter()
            .map(|r| format!("{}: {}/{}", r.quiz_id, r.score, r.total_questions))
            .collect();
        format!(
            "Student program: {}. Interests: {}. Recently studied: {}. Quiz history: {}. \
             Recommend 5 learning resources tailored to this student.",
            program,
            join_or_none(interests),
            join_or_none(recent_topics),
            if history.is_empty() {
                "none".to_string()
            } else {
                history.join(", ")
            }
        )
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn item_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*\d+\.\s+").expect("item marker regex"))
}

fn leading_punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^A-Za-z0-9]+").expect("leading punctuation regex"))
}

fn bare_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"https?://[^\s)>"']+"#).expect("url regex"))
}

/// Best-effort numbered-list parser for AI free text. Total: never panics,
/// yields zero items when the text does not match the expected shape.
///
/// Heuristic: chunks start at a leading `<digits>. ` marker; the first line of
/// a chunk is the title (leading punctuation stripped), the second line (when
/// present) the description; `Type:` / `Difficulty:` lines and a bare URL
/// anywhere in the chunk override the defaults.
pub fn parse_numbered_recommendations(text: &str) -> Vec<RecommendationItem> {
    let starts: Vec<(usize, usize)> = item_marker()
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();
    if starts.is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    for (i, &(_, body_start)) in starts.iter().enumerate() {
        let chunk_end = starts
            .get(i + 1)
            .map(|&(next_start, _)| next_start)
            .unwrap_or(text.len());
        let chunk = &text[body_start..chunk_end];

        let lines: Vec<&str> = chunk
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let Some(raw_title) = lines.first() else {
            continue;
        };
        let title = leading_punctuation()
            .replace(raw_title, "")
            .trim_end_matches(['*', '_'])
            .trim()
            .to_string();
        if title.is_empty() {
            continue;
        }

        let description = lines.get(1).map(|l| l.to_string());

        let mut resource_type = "Resource".to_string();
        let mut difficulty = "Intermediate".to_string();
        for line in &lines {
            let lower = line.to_ascii_lowercase();
            if lower.starts_with("type:") {
                if let Some((_, value)) = line.split_once(':') {
                    let value = value.trim();
                    if !value.is_empty() {
                        resource_type = value.to_string();
                    }
                }
            } else if lower.starts_with("difficulty:") {
                if let Some((_, value)) = line.split_once(':') {
                    let value = value.trim();
                    if !value.is_empty() {
                        difficulty = value.to_string();
                    }
                }
            }
        }

        let url = bare_url()
            .find(chunk)
            .map(|m| m.as_str().trim_end_matches(['.', ',']).to_string())
            .unwrap_or_else(|| placeholder_url(&title));

        items.push(RecommendationItem::from_parsed(
            title,
            description,
            url,
            resource_type,
            difficulty,
        ));
    }
    items
}

fn placeholder_url(title: &str) -> String {
    url::Url::parse_with_params("https://www.google.com/search", &[("q", title)])
        .map(String::from)
        .unwrap_or_else(|_| "https://www.google.com/search".to_string())
}
