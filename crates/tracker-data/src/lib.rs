//! 데이터 저장 및 외부 소스 어댑터.
//!
//! 이 crate는 다음을 제공합니다:
//! - SQLite 저장소 엔진 (단일 연결, 트랜잭션 쓰기)
//! - 테이블별 typed repository (티커, 시세, 뉴스, 요약 조회)
//! - 외부 데이터 소스 클라이언트 (Yahoo Finance, TickerTick, 감성 분류 서비스)

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

// 저장소 타입 재내보내기
pub use storage::news::{NewsRepository, UnlabeledNewsRow};
pub use storage::price::{JoinedPriceRow, PriceRepository};
pub use storage::sqlite::{Database, DatabaseConfig};
pub use storage::summary::{SentimentFeedRow, SummaryRepository, TickerOverviewRow};
pub use storage::ticker::TickerRepository;

// 외부 소스 클라이언트 재내보내기
pub use provider::classifier::HttpSentimentClassifier;
pub use provider::tickertick::TickerTickClient;
pub use provider::yahoo::YahooChartClient;
