use crate::error::{Error, Result};
use crate::models::recommendation::VideoItem;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

#[derive(Clone)]
pub struct VideoService {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl VideoService {
    pub fn new(api_key: String, client: Client, timeout: Duration) -> Self {
        Self {
            client,
            api_key,
            timeout,
        }
    }

    /// Searches the video provider for tutorial content on a topic.
    /// `category` narrows to educational uploads when set to "education".
    pub async fn search(
        &self,
        topic: &str,
        difficulty: &str,
        max_results: u8,
        category: Option<&str>,
    ) -> Result<Vec<VideoItem>> {
        let query = format!("{} {} tutorial", topic, difficulty);
        let max_results = max_results.clamp(1, 10).to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("part", "snippet"),
            ("q", &query),
            ("maxResults", &max_results),
            ("type", "video"),
            ("safeSearch", "strict"),
            ("key", &self.api_key),
        ];
        if matches!(category, Some(c) if c.eq_ignore_ascii_case("education")) {
            params.push(("videoCategoryId", "27"));
        }

        let res = self
            .client
            .get("https://www.googleapis.com/youtube/v3/search")
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Video provider unreachable: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Video provider error {}: {}",
                status, text
            )));
        }

        let body: JsonValue = res
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Video provider returned bad body: {}", e)))?;

        Ok(parse_search_items(&body))
    }
}

/// Maps the provider's search response onto `VideoItem`s, skipping entries
/// without a video id or title. The search endpoint does not report duration.
pub fn parse_search_items(body: &JsonValue) -> Vec<VideoItem> {
    let Some(items) = body.get("items").and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let video_id = item.get("id")?.get("videoId")?.as_str()?;
            let snippet = item.get("snippet")?;
            let title = snippet.get("title")?.as_str()?.to_string();
            let channel = snippet
                .get("channelTitle")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown channel")
                .to_string();
            let thumbnail = snippet
                .get("thumbnails")
                .and_then(|t| t.get("medium"))
                .and_then(|m| m.get("url"))
                .and_then(|u| u.as_str())
                .map(|s| s.to_string());
            Some(VideoItem {
                title,
                channel,
                duration: None,
                thumbnail,
                url: format!("https://www.youtube.com/watch?v={}", video_id),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_search_response_to_video_items() {
        let body = json!({
            "items": [
                {
                    "id": {"videoId": "abc123"},
                    "snippet": {
                        "title": "Sorting Algorithms Explained",
                        "channelTitle": "CS Channel",
                        "thumbnails": {"medium": {"url": "https://img.example/abc.jpg"}}
                    }
                },
                {
                    "id": {"channelId": "not-a-video"},
                    "snippet": {"title": "Channel result"}
                }
            ]
        });
        let items = parse_search_items(&body);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Sorting Algorithms Explained");
        assert_eq!(items[0].channel, "CS Channel");
        assert_eq!(items[0].url, "https://www.youtube.com/watch?v=abc123");
        assert!(items[0].duration.is_none());
    }

    #[test]
    fn malformed_body_yields_empty_list() {
        assert!(parse_search_items(&json!({})).is_empty());
        assert!(parse_search_items(&json!({"items": "nope"})).is_empty());
    }
}
