//! TickerTick 뉴스 피드 클라이언트.
//!
//! `GET /feed?q=z:{symbol}&n={limit}` 응답의 스토리를 날짜 구간으로
//! 걸러 도메인 타입으로 변환합니다.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;
use tracker_core::{FetchError, NewsSource, NewsStory};

use crate::provider::request_error;

const DEFAULT_BASE_URL: &str = "https://api.tickertick.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STORY_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    stories: Vec<Story>,
}

#[derive(Debug, Deserialize)]
struct Story {
    /// 게재 시각 (밀리초 epoch).
    time: i64,
    title: Option<String>,
    description: Option<String>,
    site: Option<String>,
}

/// TickerTick 뉴스 소스.
#[derive(Clone)]
pub struct TickerTickClient {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
    story_limit: u32,
}

impl TickerTickClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// 기본 URL을 지정하는 생성자 (테스트용 mock 서버 등).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("HTTP 클라이언트 생성 실패");

        Self {
            client,
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            story_limit: DEFAULT_STORY_LIMIT,
        }
    }
}

impl Default for TickerTickClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsSource for TickerTickClient {
    async fn fetch_window(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsStory>, FetchError> {
        let url = format!("{}/feed", self.base_url);
        let query = format!("z:{}", ticker.to_lowercase());
        let limit = self.story_limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("q", query.as_str()), ("n", limit.as_str())])
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: FeedResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        let total = body.stories.len();
        let mut stories = Vec::new();
        for story in body.stories {
            // 타임스탬프가 깨진 스토리는 해당 건만 건너뛴다
            let date = match chrono::DateTime::from_timestamp_millis(story.time) {
                Some(dt) => dt.date_naive(),
                None => {
                    debug!(ticker = ticker, time = story.time, "잘못된 타임스탬프 - 스킵");
                    continue;
                }
            };

            // 날짜 구간 밖이거나 필수 필드가 빠진 스토리는 제외
            if date < from || date > to {
                continue;
            }
            let (title, description) = match (story.title, story.description) {
                (Some(t), Some(d)) if !t.is_empty() && !d.is_empty() => (t, d),
                _ => continue,
            };

            stories.push(NewsStory {
                date,
                title,
                description,
                content: None,
                source: story.site.unwrap_or_else(|| "tickertick".to_string()),
            });
        }

        debug!(
            ticker = ticker,
            total = total,
            in_window = stories.len(),
            "뉴스 피드 조회"
        );

        Ok(stories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-02, 2024-01-03, 2023-12-01 00:00 UTC (밀리초)
    const FEED_BODY: &str = r#"{
        "stories": [
            {"time": 1704240000000, "title": "Guidance cut", "description": "guidance lowered", "site": "wire-a"},
            {"time": 1704153600000, "title": "Apple earnings", "description": "strong earnings", "site": "wire-b"},
            {"time": 1701388800000, "title": "Old story", "description": "stale", "site": "wire-c"},
            {"time": 1704153600000, "title": "No summary"}
        ]
    }"#;

    #[tokio::test]
    async fn test_fetch_window_filters_by_date_range() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/feed")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("q".into(), "z:aapl".into()),
                mockito::Matcher::UrlEncoded("n".into(), "100".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(FEED_BODY)
            .create_async()
            .await;

        let client = TickerTickClient::with_base_url(server.url());
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let stories = client.fetch_window("AAPL", from, to).await.unwrap();

        // 구간 밖 스토리와 요약 없는 스토리는 제외
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].description, "guidance lowered");
        assert_eq!(stories[0].source, "wire-a");
        assert_eq!(
            stories[1].date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[tokio::test]
    async fn test_fetch_window_skips_story_with_broken_timestamp() {
        let body = format!(
            r#"{{
                "stories": [
                    {{"time": {}, "title": "Broken clock", "description": "bad time", "site": "wire-a"}},
                    {{"time": 1704153600000, "title": "Apple earnings", "description": "strong earnings", "site": "wire-b"}}
                ]
            }}"#,
            i64::MAX
        );

        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/feed")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let client = TickerTickClient::with_base_url(server.url());
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let stories = client.fetch_window("AAPL", from, to).await.unwrap();

        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].description, "strong earnings");
    }

    #[tokio::test]
    async fn test_fetch_window_empty_feed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/feed")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"stories": []}"#)
            .create_async()
            .await;

        let client = TickerTickClient::with_base_url(server.url());
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let stories = client.fetch_window("AAPL", from, to).await.unwrap();

        assert!(stories.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_window_http_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/feed")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = TickerTickClient::with_base_url(server.url());
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let err = client.fetch_window("AAPL", from, to).await.unwrap_err();

        assert!(matches!(err, FetchError::Status(503)));
    }
}
