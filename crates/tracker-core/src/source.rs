//! 외부 데이터 소스 trait.
//!
//! 수집 파이프라인은 구체 클라이언트가 아니라 이 trait에만 의존합니다.
//! 각 소스별로 trait를 구현하여 소스 중립적인 수집 코드를 작성할 수 있습니다.
//!
//! # 구현 예시
//!
//! ```ignore
//! pub struct YahooChartClient {
//!     client: reqwest::Client,
//! }
//!
//! #[async_trait]
//! impl PriceSource for YahooChartClient {
//!     async fn fetch_latest(&self, ticker: &str, interval: Interval)
//!         -> Result<Option<Quote>, FetchError>
//!     {
//!         // Yahoo Finance chart API 호출 및 변환
//!     }
//! }
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Interval, NewsStory, Quote, SentimentLabel};
use crate::error::FetchError;

/// 시세 소스.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// 티커의 최신 시세 조회.
    ///
    /// 소스에 데이터가 없으면 `Ok(None)`을 반환합니다 (오류 아님).
    ///
    /// # Errors
    ///
    /// - `FetchError::Request`: 네트워크 연결 실패
    /// - `FetchError::Malformed`: 응답 파싱 실패
    async fn fetch_latest(
        &self,
        ticker: &str,
        interval: Interval,
    ) -> Result<Option<Quote>, FetchError>;
}

/// 뉴스 소스.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// 날짜 범위 내 티커 관련 기사 조회.
    ///
    /// 기사가 없으면 빈 Vec을 반환합니다 (오류 아님).
    async fn fetch_window(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsStory>, FetchError>;
}

/// 감성 분류기.
///
/// 분류 모델의 로딩/추론은 외부 서비스 책임이며, 파이프라인은
/// `classify(text) -> label` 능력만 필요로 합니다.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// 텍스트를 긍정/부정/중립으로 분류.
    async fn classify(&self, text: &str) -> Result<SentimentLabel, FetchError>;
}
