//! Ticker Tracker 핵심 도메인 타입.
//!
//! 이 crate는 다음을 제공합니다:
//! - 도메인 엔티티 (`Ticker`, `PricePoint`, `NewsItem`)
//! - 외부 데이터 소스 trait (`PriceSource`, `NewsSource`, `SentimentClassifier`)
//! - 수집/검증 오류 타입

pub mod domain;
pub mod error;
pub mod source;

pub use domain::{Interval, NewsItem, NewsStory, PricePoint, Quote, SentimentLabel, Ticker};
pub use error::{FetchError, ValidationError};
pub use source::{NewsSource, PriceSource, SentimentClassifier};
