//! 티커 repository.

use sqlx::FromRow;
use tracing::debug;
use tracker_core::Ticker;

use crate::error::{DataError, Result};
use crate::storage::sqlite::Database;

/// 티커 데이터베이스 레코드.
#[derive(Debug, Clone, FromRow)]
struct TickerRecord {
    id: i64,
    symbol: String,
}

impl TickerRecord {
    fn into_ticker(self) -> Ticker {
        Ticker {
            id: self.id,
            symbol: self.symbol,
        }
    }
}

/// 티커 테이블 접근.
#[derive(Clone)]
pub struct TickerRepository {
    db: Database,
}

impl TickerRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 심볼로 티커 조회.
    pub async fn get_by_symbol(&self, symbol: &str) -> Result<Option<Ticker>> {
        let record: Option<TickerRecord> =
            sqlx::query_as("SELECT id, symbol FROM tickers WHERE symbol = ?")
                .bind(symbol)
                .fetch_optional(self.db.pool())
                .await?;

        Ok(record.map(TickerRecord::into_ticker))
    }

    /// 새 티커 삽입.
    ///
    /// 같은 심볼이 이미 있으면 `DataError::Duplicate`를 반환합니다.
    pub async fn insert(&self, symbol: &str) -> Result<i64> {
        let mut tx = self.db.begin().await?;
        let result = sqlx::query("INSERT INTO tickers (symbol) VALUES (?)")
            .bind(symbol)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.last_insert_rowid())
    }

    /// 심볼의 티커를 조회하고 없으면 생성합니다.
    ///
    /// 삽입 후 재조회 방식이며, 동시 단위가 같은 심볼을 먼저 삽입하여
    /// UNIQUE 제약에 걸리면 삽입 실패를 무시하고 재조회 결과를
    /// 신뢰합니다 (제약이 진실의 원천).
    pub async fn resolve_or_create(&self, symbol: &str) -> Result<Ticker> {
        if let Some(ticker) = self.get_by_symbol(symbol).await? {
            return Ok(ticker);
        }

        match self.insert(symbol).await {
            Ok(id) => {
                debug!(symbol = symbol, id = id, "새 티커 등록");
                Ok(Ticker {
                    id,
                    symbol: symbol.to_string(),
                })
            }
            // 동시 삽입 경합 — 재조회가 권위 있는 결과
            Err(DataError::Duplicate(_)) => self
                .get_by_symbol(symbol)
                .await?
                .ok_or_else(|| DataError::NotFound(format!("ticker {}", symbol))),
            Err(e) => Err(e),
        }
    }

    /// 등록된 모든 티커 조회.
    pub async fn list(&self) -> Result<Vec<Ticker>> {
        let records: Vec<TickerRecord> =
            sqlx::query_as("SELECT id, symbol FROM tickers ORDER BY symbol")
                .fetch_all(self.db.pool())
                .await?;

        Ok(records.into_iter().map(TickerRecord::into_ticker).collect())
    }
}
