//! SQLite 저장소 엔진.
//!
//! 프로세스당 하나의 물리 데이터베이스 파일을 소유하며, 스키마 생성과
//! 트랜잭션 읽기/쓰기 프리미티브를 제공합니다.
//!
//! # 동시성 규칙
//!
//! 백킹 스토어가 단일 로컬 파일이므로 풀의 최대 연결 수를 1로 고정하여
//! 모든 쓰기를 하나의 연결 뒤에 직렬화합니다. 읽기도 같은 게이트를
//! 통과하므로 항상 마지막 커밋 상태를 반영합니다.
//!
//! # 연결 수명
//!
//! 풀은 lazy하게 생성되어 첫 작업에서 실제 연결이 열립니다.
//! `close()` 이후의 모든 작업은 재연결 없이 `DataError::PoolClosed`로
//! 거부됩니다.

use std::time::Duration;

use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info};

use crate::error::{DataError, Result};

/// 테이블 생성 DDL.
///
/// 고유 제약과 외래 키가 중복 제거와 참조 무결성의 단일 집행 지점입니다.
/// `IF NOT EXISTS`로 멱등하게 실행됩니다.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS tickers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS price_points (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ticker_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    close REAL NOT NULL,
    volume INTEGER NOT NULL,
    FOREIGN KEY (ticker_id) REFERENCES tickers(id),
    UNIQUE (ticker_id, date)
);

CREATE TABLE IF NOT EXISTS news_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ticker_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    content TEXT,
    source TEXT NOT NULL,
    sentiment_label TEXT,
    claimed_at TEXT,
    FOREIGN KEY (ticker_id) REFERENCES tickers(id),
    UNIQUE (ticker_id, date, description)
);
"#;

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 데이터베이스 파일 경로
    pub path: String,
    /// busy timeout (초) — 잠금 경합 시 대기 시간
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
    /// 파일이 없으면 생성
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,
}

fn default_busy_timeout() -> u64 {
    5
}
fn default_create_if_missing() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/tracker.db".to_string(),
            busy_timeout_secs: default_busy_timeout(),
            create_if_missing: default_create_if_missing(),
        }
    }
}

/// 데이터베이스 연결 풀 래퍼.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// 데이터베이스를 열고 스키마를 보장합니다.
    ///
    /// 풀은 lazy하게 생성되며 스키마 보장이 첫 작업으로 실제 연결을
    /// 엽니다. 파일의 부모 디렉터리가 없으면 생성합니다.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(&config.path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DataError::ConnectionError(e.to_string()))?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(config.create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
            .foreign_keys(true);

        // 단일 연결: 쓰기 직렬화 게이트
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_lazy_with(options);

        let db = Self { pool };
        db.init_schema().await?;

        info!(path = %config.path, "데이터베이스 준비 완료");
        Ok(db)
    }

    /// 인메모리 데이터베이스 생성 (테스트용).
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        // 인메모리 DB는 연결이 닫히면 내용이 사라지므로
        // 단일 연결을 풀에 상주시킨다
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_lazy_with(options);

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// 내부 연결 풀을 반환합니다.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 테이블 스키마를 멱등하게 보장합니다.
    async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        debug!("스키마 확인 완료");
        Ok(())
    }

    /// 쓰기 트랜잭션 시작.
    ///
    /// 커밋 전 드롭되면 자동으로 롤백됩니다.
    pub async fn begin(&self) -> Result<Transaction<'_, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// 데이터베이스 상태 확인.
    pub async fn health_check(&self) -> Result<bool> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(true)
    }

    /// 연결을 명시적으로 닫습니다.
    ///
    /// 이후의 모든 작업은 `DataError::PoolClosed`로 실패합니다.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("데이터베이스 연결 종료");
    }

    /// 풀이 닫혔는지 확인.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}
