//! 외부 감성 분석 서비스 클라이언트.
//!
//! 분류 모델은 수집기와 별도 프로세스로 배포되며, 이 클라이언트는
//! `POST /classify`로 텍스트를 보내 라벨을 받아옵니다.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracker_core::{FetchError, SentimentClassifier, SentimentLabel};

use crate::provider::request_error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    label: String,
}

/// HTTP 기반 감성 분류기.
#[derive(Clone)]
pub struct HttpSentimentClassifier {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpSentimentClassifier {
    /// 분류 서비스 기본 URL로 클라이언트 생성.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("HTTP 클라이언트 생성 실패");

        Self {
            client,
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[async_trait]
impl SentimentClassifier for HttpSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentLabel, FetchError> {
        let url = format!("{}/classify", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ClassifyRequest { text })
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        body.label
            .parse()
            .map_err(|_| FetchError::Malformed(format!("알 수 없는 라벨: {}", body.label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_classify_parses_label() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/classify")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "text": "strong earnings"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"label": "positive"}"#)
            .create_async()
            .await;

        let classifier = HttpSentimentClassifier::new(server.url());
        let label = classifier.classify("strong earnings").await.unwrap();

        assert_eq!(label, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn test_classify_rejects_unknown_label() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/classify")
            .with_status(200)
            .with_body(r#"{"label": "bullish"}"#)
            .create_async()
            .await;

        let classifier = HttpSentimentClassifier::new(server.url());
        let err = classifier.classify("strong earnings").await.unwrap_err();

        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_classify_http_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/classify")
            .with_status(500)
            .create_async()
            .await;

        let classifier = HttpSentimentClassifier::new(server.url());
        let err = classifier.classify("strong earnings").await.unwrap_err();

        assert!(matches!(err, FetchError::Status(500)));
    }
}
