//! 도메인 엔티티 정의.
//!
//! 이 모듈은 저장소에 영속되는 엔티티와 외부 소스에서 가져오는
//! 원시 데이터 타입을 정의합니다:
//! - `Ticker` - 추적 대상 심볼
//! - `PricePoint` - 일자별 종가 레코드
//! - `NewsItem` - 일자별 뉴스 레코드 (감성 라벨 포함)
//! - `Quote` / `NewsStory` - 외부 소스 응답 (저장 전)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// 감성 분류 라벨.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    /// 긍정
    Positive,
    /// 부정
    Negative,
    /// 중립
    Neutral,
}

impl SentimentLabel {
    /// DB 저장용 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            _ => Err(ValidationError::invalid("sentiment_label")),
        }
    }
}

/// 시세 조회 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    /// 일봉
    D1,
    /// 주봉
    W1,
}

impl Interval {
    /// 외부 API 요청용 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::D1 => "1d",
            Interval::W1 => "1wk",
        }
    }
}

/// 추적 대상 심볼.
///
/// 어떤 소스든 해당 심볼의 데이터를 처음 반환했을 때 lazy하게 생성됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// 고유 ID
    pub id: i64,
    /// 심볼 (예: "AAPL"), 고유
    pub symbol: String,
}

/// 티커 하나의 일자별 시세 레코드.
///
/// `(ticker_id, date)` 기준 고유이며 한번 저장되면 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 고유 ID
    pub id: i64,
    /// 소속 티커 ID
    pub ticker_id: i64,
    /// 거래일
    pub date: NaiveDate,
    /// 종가
    pub close: f64,
    /// 거래량
    pub volume: i64,
}

/// 티커 하나의 일자별 뉴스 레코드.
///
/// `(ticker_id, date, description)` 기준 고유.
/// `sentiment_label`은 NULL로 시작하여 감성 분석 단계에서 정확히 한 번
/// 설정되며, 이후 NULL로 되돌아가지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// 고유 ID
    pub id: i64,
    /// 소속 티커 ID
    pub ticker_id: i64,
    /// 기사 일자
    pub date: NaiveDate,
    /// 기사 제목
    pub title: String,
    /// 기사 요약 (중복 제거 키의 일부)
    pub description: String,
    /// 기사 본문 (선택)
    pub content: Option<String>,
    /// 출처 (사이트명 등)
    pub source: String,
    /// 감성 라벨 (분석 전이면 None)
    pub sentiment_label: Option<SentimentLabel>,
}

/// 외부 시세 소스가 반환한 최신 시세.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// 거래일
    pub date: NaiveDate,
    /// 종가
    pub close: f64,
    /// 거래량
    pub volume: i64,
}

/// 외부 뉴스 소스가 반환한 기사 하나.
///
/// 저장 전 `validate()`로 필수 필드를 검증합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsStory {
    /// 기사 일자
    pub date: NaiveDate,
    /// 기사 제목
    pub title: String,
    /// 기사 요약
    pub description: String,
    /// 기사 본문 (선택)
    pub content: Option<String>,
    /// 출처
    pub source: String,
}

impl NewsStory {
    /// 필수 필드 검증.
    ///
    /// 제목, 요약, 출처가 비어 있으면 해당 행은 저장하지 않고 건너뜁니다.
    /// 요약은 중복 제거 키의 일부이므로 비어 있으면 안 됩니다.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::missing("title"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::missing("description"));
        }
        if self.source.trim().is_empty() {
            return Err(ValidationError::missing("source"));
        }
        Ok(())
    }
}
