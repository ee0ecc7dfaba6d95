//! 환경변수 기반 설정 모듈.

use std::time::Duration;

use crate::Result;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// SQLite 데이터베이스 파일 경로
    pub database_path: String,
    /// 추적 대상 티커 심볼 목록
    pub tickers: Vec<String>,
    /// 시세 수집 설정
    pub price_collect: PriceCollectConfig,
    /// 뉴스 수집 설정
    pub news_collect: NewsCollectConfig,
    /// 감성 분석 설정
    pub enrich: EnrichConfig,
}

/// 시세 수집 설정
#[derive(Debug, Clone)]
pub struct PriceCollectConfig {
    /// 수집 활성화 여부
    pub enabled: bool,
    /// 실행 주기 (초)
    pub interval_secs: u64,
    /// 외부 조회당 타임아웃 (초)
    pub fetch_timeout_secs: u64,
    /// 동시 수집 티커 수
    pub concurrent_limit: usize,
}

/// 뉴스 수집 설정
#[derive(Debug, Clone)]
pub struct NewsCollectConfig {
    /// 수집 활성화 여부
    pub enabled: bool,
    /// 실행 주기 (초)
    pub interval_secs: u64,
    /// 외부 조회당 타임아웃 (초)
    pub fetch_timeout_secs: u64,
    /// 동시 수집 티커 수
    pub concurrent_limit: usize,
    /// 수집 날짜 구간 (오늘로부터 N일 전까지)
    pub window_days: i64,
}

/// 감성 분석 설정
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// 분석 활성화 여부
    pub enabled: bool,
    /// 실행 주기 (초)
    pub interval_secs: u64,
    /// 분류 요청당 타임아웃 (초)
    pub fetch_timeout_secs: u64,
    /// 실행당 처리할 최대 기사 수
    pub batch_size: i64,
    /// 기사 claim 유효 시간 (초) — 지나면 만료되어 다른 실행이 회수
    pub claim_ttl_secs: u64,
    /// 감성 분류 서비스 URL
    pub classifier_url: String,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let tickers = env_var_list_or_default(
            "TRACKER_TICKERS",
            vec!["AAPL".to_string(), "MSFT".to_string(), "NVDA".to_string()],
        );
        if tickers.is_empty() {
            return Err(crate::error::CollectorError::Config(
                "TRACKER_TICKERS가 비어 있습니다".to_string(),
            ));
        }

        Ok(Self {
            database_path: std::env::var("TRACKER_DB_PATH")
                .unwrap_or_else(|_| "data/tracker.db".to_string()),
            tickers,
            price_collect: PriceCollectConfig {
                enabled: env_var_bool("PRICE_COLLECT_ENABLED", true),
                interval_secs: env_var_parse("PRICE_INTERVAL_SECS", 10),
                fetch_timeout_secs: env_var_parse("PRICE_FETCH_TIMEOUT_SECS", 10),
                concurrent_limit: env_var_parse("PRICE_CONCURRENT_LIMIT", 4),
            },
            news_collect: NewsCollectConfig {
                enabled: env_var_bool("NEWS_COLLECT_ENABLED", true),
                interval_secs: env_var_parse("NEWS_INTERVAL_SECS", 30),
                fetch_timeout_secs: env_var_parse("NEWS_FETCH_TIMEOUT_SECS", 10),
                concurrent_limit: env_var_parse("NEWS_CONCURRENT_LIMIT", 4),
                window_days: env_var_parse("NEWS_WINDOW_DAYS", 7),
            },
            enrich: EnrichConfig {
                enabled: env_var_bool("ENRICH_ENABLED", true),
                interval_secs: env_var_parse("ENRICH_INTERVAL_SECS", 15),
                fetch_timeout_secs: env_var_parse("ENRICH_FETCH_TIMEOUT_SECS", 30),
                batch_size: env_var_parse("ENRICH_BATCH_SIZE", 50),
                claim_ttl_secs: env_var_parse("ENRICH_CLAIM_TTL_SECS", 300),
                classifier_url: std::env::var("SENTIMENT_SERVICE_URL")
                    .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
            },
        })
    }
}

impl PriceCollectConfig {
    /// 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// 조회 타임아웃을 Duration으로 반환
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl NewsCollectConfig {
    /// 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// 조회 타임아웃을 Duration으로 반환
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl EnrichConfig {
    /// 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// 분류 타임아웃을 Duration으로 반환
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 bool 값 파싱
fn env_var_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

/// 환경변수에서 쉼표로 구분된 리스트 파싱 (기본값 지원)
fn env_var_list_or_default(key: &str, default: Vec<String>) -> Vec<String> {
    std::env::var(key)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_parse_fallback() {
        std::env::set_var("TRACKER_TEST_PARSE", "not-a-number");
        assert_eq!(env_var_parse("TRACKER_TEST_PARSE", 7u64), 7);
        std::env::set_var("TRACKER_TEST_PARSE", "42");
        assert_eq!(env_var_parse("TRACKER_TEST_PARSE", 7u64), 42);
        std::env::remove_var("TRACKER_TEST_PARSE");
    }

    #[test]
    fn test_env_var_list_normalizes_symbols() {
        std::env::set_var("TRACKER_TEST_LIST", " aapl, msft ,,nvda ");
        let list = env_var_list_or_default("TRACKER_TEST_LIST", vec![]);
        assert_eq!(list, vec!["AAPL", "MSFT", "NVDA"]);
        std::env::remove_var("TRACKER_TEST_LIST");
    }

    #[test]
    fn test_env_var_bool() {
        std::env::set_var("TRACKER_TEST_BOOL", "1");
        assert!(env_var_bool("TRACKER_TEST_BOOL", false));
        std::env::set_var("TRACKER_TEST_BOOL", "no");
        assert!(!env_var_bool("TRACKER_TEST_BOOL", true));
        std::env::remove_var("TRACKER_TEST_BOOL");
    }
}
