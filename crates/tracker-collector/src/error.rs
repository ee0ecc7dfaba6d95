//! 에러 타입 정의.

use std::fmt;

/// Collector 에러 타입
#[derive(Debug)]
pub enum CollectorError {
    /// 저장소 에러
    Data(tracker_data::DataError),
    /// 설정 에러
    Config(String),
    /// 데이터 소스 에러 (Yahoo, TickerTick, 분류 서비스 등)
    Source(tracker_core::FetchError),
    /// 스케줄링 에러
    Scheduling(String),
    /// 일반 에러
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(e) => write!(f, "Storage error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Source(e) => write!(f, "Data source error: {}", e),
            Self::Scheduling(msg) => write!(f, "Scheduling error: {}", msg),
            Self::Other(e) => write!(f, "Error: {}", e),
        }
    }
}

impl std::error::Error for CollectorError {}

impl From<tracker_data::DataError> for CollectorError {
    fn from(err: tracker_data::DataError) -> Self {
        Self::Data(err)
    }
}

impl From<tracker_core::FetchError> for CollectorError {
    fn from(err: tracker_core::FetchError) -> Self {
        Self::Source(err)
    }
}

impl From<std::env::VarError> for CollectorError {
    fn from(err: std::env::VarError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CollectorError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Other(err)
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
