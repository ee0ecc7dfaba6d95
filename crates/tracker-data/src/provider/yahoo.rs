//! Yahoo Finance 차트 API 클라이언트.
//!
//! `GET /v8/finance/chart/{symbol}` 응답에서 가장 최근 거래일의
//! 종가와 거래량을 추출합니다.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use tracker_core::{FetchError, Interval, PriceSource, Quote};

use crate::provider::request_error;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// 차트 API 응답 구조 (필요한 필드만).
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<i64>>>,
}

/// Yahoo Finance 시세 소스.
#[derive(Clone)]
pub struct YahooChartClient {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl YahooChartClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// 기본 URL을 지정하는 생성자 (테스트용 mock 서버 등).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent("Mozilla/5.0 (compatible; ticker-tracker/0.1)")
            .build()
            .expect("HTTP 클라이언트 생성 실패");

        Self {
            client,
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for YahooChartClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for YahooChartClient {
    async fn fetch_latest(
        &self,
        ticker: &str,
        interval: Interval,
    ) -> Result<Option<Quote>, FetchError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let range = match interval {
            Interval::D1 => "5d",
            Interval::W1 => "1mo",
        };

        let response = self
            .client
            .get(&url)
            .query(&[("interval", interval.as_str()), ("range", range)])
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        let result = match body.chart.result.and_then(|mut r| {
            if r.is_empty() {
                None
            } else {
                Some(r.remove(0))
            }
        }) {
            Some(result) => result,
            None => {
                debug!(ticker = ticker, "차트 결과 없음");
                return Ok(None);
            }
        };

        let timestamps = result.timestamp.unwrap_or_default();
        let quote_block = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Malformed("indicators.quote 누락".to_string()))?;
        let closes = quote_block.close.unwrap_or_default();
        let volumes = quote_block.volume.unwrap_or_default();

        // 뒤에서부터 종가와 거래량이 모두 있는 가장 최근 봉을 찾는다
        // (장중에는 마지막 봉의 값이 null일 수 있음)
        for idx in (0..timestamps.len()).rev() {
            let close = closes.get(idx).copied().flatten();
            let volume = volumes.get(idx).copied().flatten();
            if let (Some(close), Some(volume)) = (close, volume) {
                let date = chrono::DateTime::from_timestamp(timestamps[idx], 0)
                    .ok_or_else(|| {
                        FetchError::Malformed(format!("잘못된 타임스탬프: {}", timestamps[idx]))
                    })?
                    .date_naive();

                return Ok(Some(Quote {
                    date,
                    close,
                    volume,
                }));
            }
        }

        Ok(None)
    }
}
