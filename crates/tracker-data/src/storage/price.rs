//! 시세 repository.

use chrono::NaiveDate;
use sqlx::FromRow;
use tracing::debug;
use tracker_core::{PricePoint, Quote};

use crate::error::{DataError, Result};
use crate::storage::sqlite::Database;

/// 시세 데이터베이스 레코드.
#[derive(Debug, Clone, FromRow)]
struct PricePointRecord {
    id: i64,
    ticker_id: i64,
    date: NaiveDate,
    close: f64,
    volume: i64,
}

impl PricePointRecord {
    fn into_price_point(self) -> PricePoint {
        PricePoint {
            id: self.id,
            ticker_id: self.ticker_id,
            date: self.date,
            close: self.close,
            volume: self.volume,
        }
    }
}

/// 티커 심볼이 포함된 조인 행.
#[derive(Debug, Clone, FromRow)]
pub struct JoinedPriceRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub volume: i64,
}

/// 시세 테이블 접근.
#[derive(Clone)]
pub struct PriceRepository {
    db: Database,
}

impl PriceRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// `(ticker_id, date)` 시세 존재 여부 확인.
    pub async fn exists(&self, ticker_id: i64, date: NaiveDate) -> Result<bool> {
        let found: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM price_points WHERE ticker_id = ? AND date = ?")
                .bind(ticker_id)
                .bind(date)
                .fetch_optional(self.db.pool())
                .await?;

        Ok(found.is_some())
    }

    /// 새 시세 삽입.
    pub async fn insert(&self, ticker_id: i64, quote: &Quote) -> Result<i64> {
        let mut tx = self.db.begin().await?;
        let result = sqlx::query(
            "INSERT INTO price_points (ticker_id, date, close, volume) VALUES (?, ?, ?, ?)",
        )
        .bind(ticker_id)
        .bind(quote.date)
        .bind(quote.close)
        .bind(quote.volume)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(result.last_insert_rowid())
    }

    /// 멱등 삽입: 같은 `(ticker_id, date)` 행이 이미 있으면 no-op.
    ///
    /// 중복 검사와 삽입 사이에 다른 단위가 먼저 삽입한 경우에도
    /// UNIQUE 제약 위반을 no-op으로 처리합니다.
    ///
    /// # 반환
    /// 새로 삽입했으면 `true`, 기존 행을 확인하고 건너뛰었으면 `false`.
    pub async fn insert_if_absent(&self, ticker_id: i64, quote: &Quote) -> Result<bool> {
        if self.exists(ticker_id, quote.date).await? {
            debug!(ticker_id = ticker_id, date = %quote.date, "기존 시세 - 스킵");
            return Ok(false);
        }

        match self.insert(ticker_id, quote).await {
            Ok(_) => Ok(true),
            Err(DataError::Duplicate(_)) => {
                debug!(ticker_id = ticker_id, date = %quote.date, "동시 삽입 경합 - 스킵");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// 티커의 모든 시세 조회 (날짜순).
    pub async fn fetch_by_ticker(&self, ticker_id: i64) -> Result<Vec<PricePoint>> {
        let records: Vec<PricePointRecord> = sqlx::query_as(
            "SELECT id, ticker_id, date, close, volume FROM price_points \
             WHERE ticker_id = ? ORDER BY date",
        )
        .bind(ticker_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(records
            .into_iter()
            .map(PricePointRecord::into_price_point)
            .collect())
    }

    /// 티커의 최신 시세 조회.
    pub async fn latest_for_ticker(&self, ticker_id: i64) -> Result<Option<PricePoint>> {
        let record: Option<PricePointRecord> = sqlx::query_as(
            "SELECT id, ticker_id, date, close, volume FROM price_points \
             WHERE ticker_id = ? ORDER BY date DESC LIMIT 1",
        )
        .bind(ticker_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(record.map(PricePointRecord::into_price_point))
    }

    /// 티커 테이블과 조인한 시세 조회.
    pub async fn fetch_joined(&self, ticker_id: i64) -> Result<Vec<JoinedPriceRow>> {
        let rows: Vec<JoinedPriceRow> = sqlx::query_as(
            "SELECT t.symbol, p.date, p.close, p.volume \
             FROM tickers t JOIN price_points p ON t.id = p.ticker_id \
             WHERE t.id = ? ORDER BY p.date",
        )
        .bind(ticker_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ticker::TickerRepository;

    fn quote() -> Quote {
        Quote {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            close: 150.0,
            volume: 1000,
        }
    }

    async fn setup() -> (Database, i64) {
        let db = Database::connect_in_memory().await.unwrap();
        let ticker = TickerRepository::new(db.clone())
            .resolve_or_create("AAPL")
            .await
            .unwrap();
        (db, ticker.id)
    }

    #[tokio::test]
    async fn test_insert_if_absent_is_idempotent() {
        let (db, ticker_id) = setup().await;
        let repo = PriceRepository::new(db);

        assert!(repo.insert_if_absent(ticker_id, &quote()).await.unwrap());
        assert!(!repo.insert_if_absent(ticker_id, &quote()).await.unwrap());

        let rows = repo.fetch_by_ticker(ticker_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close, 150.0);
        assert_eq!(rows[0].volume, 1000);
    }

    #[tokio::test]
    async fn test_unique_constraint_on_ticker_and_date() {
        let (db, ticker_id) = setup().await;
        let repo = PriceRepository::new(db);

        repo.insert(ticker_id, &quote()).await.unwrap();
        let err = repo.insert(ticker_id, &quote()).await.unwrap_err();
        assert!(matches!(err, DataError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_same_date_allowed_across_tickers() {
        let (db, aapl_id) = setup().await;
        let msft = TickerRepository::new(db.clone())
            .resolve_or_create("MSFT")
            .await
            .unwrap();
        let repo = PriceRepository::new(db);

        assert!(repo.insert_if_absent(aapl_id, &quote()).await.unwrap());
        assert!(repo.insert_if_absent(msft.id, &quote()).await.unwrap());
    }

    #[tokio::test]
    async fn test_latest_and_joined() {
        let (db, ticker_id) = setup().await;
        let repo = PriceRepository::new(db);

        repo.insert(ticker_id, &quote()).await.unwrap();
        repo.insert(
            ticker_id,
            &Quote {
                date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                close: 152.5,
                volume: 2000,
            },
        )
        .await
        .unwrap();

        let latest = repo.latest_for_ticker(ticker_id).await.unwrap().unwrap();
        assert_eq!(latest.date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());

        let joined = repo.fetch_joined(ticker_id).await.unwrap();
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].symbol, "AAPL");
    }
}
