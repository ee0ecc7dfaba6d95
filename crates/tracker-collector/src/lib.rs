//! 주기적 시세·뉴스 수집과 감성 분석 파이프라인.
//!
//! 시세와 기사를 외부 소스에서 모아 SQLite에 중복 없이 저장하고,
//! 라벨 없는 기사를 외부 분류 서비스로 보내 감성 라벨을 붙입니다.

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::{CollectorConfig, EnrichConfig, NewsCollectConfig, PriceCollectConfig};
pub use error::{CollectorError, Result};
pub use stats::CollectionStats;
