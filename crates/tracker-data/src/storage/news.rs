//! 뉴스 repository.
//!
//! 감성 라벨 쓰기는 compare-and-set 방식입니다:
//! `UPDATE ... WHERE id = ? AND sentiment_label IS NULL`.
//! 한번 설정된 라벨은 이후 어떤 실행에서도 덮어쓰이지 않습니다.
//!
//! 분석 대상 기사는 `claim_unlabeled`로 한 트랜잭션 안에서 차지한 뒤
//! 분류합니다. 겹치는 실행은 유효한 claim이 걸린 기사를 가져가지
//! 못하므로 같은 기사를 두 번 분류하지 않습니다.

use chrono::NaiveDate;
use sqlx::FromRow;
use tracing::debug;
use tracker_core::{NewsItem, NewsStory, SentimentLabel};

use crate::error::{DataError, Result};
use crate::storage::sqlite::Database;

/// 뉴스 데이터베이스 레코드.
#[derive(Debug, Clone, FromRow)]
struct NewsItemRecord {
    id: i64,
    ticker_id: i64,
    date: NaiveDate,
    title: String,
    description: String,
    content: Option<String>,
    source: String,
    sentiment_label: Option<String>,
}

impl NewsItemRecord {
    fn into_news_item(self) -> NewsItem {
        NewsItem {
            id: self.id,
            ticker_id: self.ticker_id,
            date: self.date,
            title: self.title,
            description: self.description,
            content: self.content,
            source: self.source,
            sentiment_label: self.sentiment_label.and_then(|s| s.parse().ok()),
        }
    }
}

/// 분석 대기 중인 뉴스 행 (분류 입력에 필요한 컬럼만).
#[derive(Debug, Clone, FromRow)]
pub struct UnlabeledNewsRow {
    pub id: i64,
    pub description: String,
}

const SELECT_COLUMNS: &str =
    "id, ticker_id, date, title, description, content, source, sentiment_label";

/// 뉴스 테이블 접근.
#[derive(Clone)]
pub struct NewsRepository {
    db: Database,
}

impl NewsRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// `(ticker_id, date, description)` 기사 존재 여부 확인.
    pub async fn exists(
        &self,
        ticker_id: i64,
        date: NaiveDate,
        description: &str,
    ) -> Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM news_items WHERE ticker_id = ? AND date = ? AND description = ?",
        )
        .bind(ticker_id)
        .bind(date)
        .bind(description)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(found.is_some())
    }

    /// 새 기사 삽입 (`sentiment_label`은 NULL로 시작).
    pub async fn insert(&self, ticker_id: i64, story: &NewsStory) -> Result<i64> {
        let mut tx = self.db.begin().await?;
        let result = sqlx::query(
            "INSERT INTO news_items (ticker_id, date, title, description, content, source) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(ticker_id)
        .bind(story.date)
        .bind(&story.title)
        .bind(&story.description)
        .bind(&story.content)
        .bind(&story.source)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(result.last_insert_rowid())
    }

    /// 멱등 삽입: 같은 `(ticker_id, date, description)` 행이 있으면 no-op.
    ///
    /// # 반환
    /// 새로 삽입했으면 `true`, 건너뛰었으면 `false`.
    pub async fn insert_if_absent(&self, ticker_id: i64, story: &NewsStory) -> Result<bool> {
        if self
            .exists(ticker_id, story.date, &story.description)
            .await?
        {
            debug!(ticker_id = ticker_id, date = %story.date, "기존 기사 - 스킵");
            return Ok(false);
        }

        match self.insert(ticker_id, story).await {
            Ok(_) => Ok(true),
            Err(DataError::Duplicate(_)) => {
                debug!(ticker_id = ticker_id, date = %story.date, "동시 삽입 경합 - 스킵");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// 티커의 모든 기사 조회 (최신순).
    pub async fn fetch_by_ticker(&self, ticker_id: i64) -> Result<Vec<NewsItem>> {
        let records: Vec<NewsItemRecord> = sqlx::query_as(&format!(
            "SELECT {} FROM news_items WHERE ticker_id = ? ORDER BY date DESC, id",
            SELECT_COLUMNS
        ))
        .bind(ticker_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(records
            .into_iter()
            .map(NewsItemRecord::into_news_item)
            .collect())
    }

    /// 라벨이 없는 기사 배치 조회 (오래된 것부터).
    pub async fn fetch_unlabeled(&self, limit: i64) -> Result<Vec<UnlabeledNewsRow>> {
        let rows: Vec<UnlabeledNewsRow> = sqlx::query_as(
            "SELECT id, description FROM news_items \
             WHERE sentiment_label IS NULL ORDER BY id LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows)
    }

    /// 분석 대상 기사 배치를 원자적으로 차지(claim).
    ///
    /// 라벨이 없고 유효한 claim도 없는 기사를 골라 같은 트랜잭션 안에서
    /// claim 시각을 기록합니다. 차지된 기사는 `ttl_secs`가 지나기 전까지
    /// 다른 실행의 claim 대상에서 제외되므로, 데몬과 단발 CLI 실행이
    /// 겹쳐도 같은 기사를 두 번 분류하지 않습니다. `ttl_secs`가 지난
    /// claim은 만료로 취급되어 중단된 실행의 기사를 회수합니다.
    pub async fn claim_unlabeled(
        &self,
        limit: i64,
        ttl_secs: u64,
    ) -> Result<Vec<UnlabeledNewsRow>> {
        let mut tx = self.db.begin().await?;

        let rows: Vec<UnlabeledNewsRow> = sqlx::query_as(
            "SELECT id, description FROM news_items \
             WHERE sentiment_label IS NULL \
               AND (claimed_at IS NULL OR claimed_at <= datetime('now', ?)) \
             ORDER BY id LIMIT ?",
        )
        .bind(format!("-{} seconds", ttl_secs))
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;

        if rows.is_empty() {
            tx.commit().await?;
            return Ok(rows);
        }

        let placeholders = vec!["?"; rows.len()].join(", ");
        let update_sql = format!(
            "UPDATE news_items SET claimed_at = datetime('now') WHERE id IN ({})",
            placeholders
        );
        let mut update = sqlx::query(&update_sql);
        for row in &rows {
            update = update.bind(row.id);
        }
        update.execute(&mut *tx).await?;
        tx.commit().await?;

        debug!(claimed = rows.len(), "분석 대상 기사 claim");
        Ok(rows)
    }

    /// 분류에 실패한 기사의 claim 해제.
    ///
    /// 다음 실행이 만료를 기다리지 않고 바로 재시도할 수 있게 합니다.
    pub async fn release_claim(&self, id: i64) -> Result<()> {
        let mut tx = self.db.begin().await?;
        sqlx::query(
            "UPDATE news_items SET claimed_at = NULL \
             WHERE id = ? AND sentiment_label IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// 라벨이 없는 기사 수.
    pub async fn count_unlabeled(&self) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM news_items WHERE sentiment_label IS NULL")
                .fetch_one(self.db.pool())
                .await?;

        Ok(count)
    }

    /// 감성 라벨 기록 (compare-and-set).
    ///
    /// 라벨이 아직 NULL인 행에만 기록합니다. 겹치는 실행이나 다른
    /// 프로세스가 먼저 라벨을 기록했으면 no-op이 되어 단조성이
    /// 유지됩니다.
    ///
    /// # 반환
    /// 라벨을 기록했으면 `true`, 이미 라벨이 있어 건너뛰었으면 `false`.
    pub async fn set_label(&self, id: i64, label: SentimentLabel) -> Result<bool> {
        let mut tx = self.db.begin().await?;
        let result = sqlx::query(
            "UPDATE news_items SET sentiment_label = ?, claimed_at = NULL \
             WHERE id = ? AND sentiment_label IS NULL",
        )
        .bind(label.as_str())
        .bind(id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(result.rows_affected() == 1)
    }

    /// 기사 단건 조회.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<NewsItem>> {
        let record: Option<NewsItemRecord> = sqlx::query_as(&format!(
            "SELECT {} FROM news_items WHERE id = ?",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(record.map(NewsItemRecord::into_news_item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ticker::TickerRepository;

    fn story(description: &str) -> NewsStory {
        NewsStory {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            title: "Apple earnings".to_string(),
            description: description.to_string(),
            content: None,
            source: "newswire".to_string(),
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
    async fn test_distinct_descriptions_on_same_date() {
        let (db, ticker_id) = setup().await;
        let repo = NewsRepository::new(db);

        assert!(repo
            .insert_if_absent(ticker_id, &story("strong earnings"))
            .await
            .unwrap());
        assert!(repo
            .insert_if_absent(ticker_id, &story("guidance cut"))
            .await
            .unwrap());
        // 같은 요약은 중복
        assert!(!repo
            .insert_if_absent(ticker_id, &story("strong earnings"))
            .await
            .unwrap());

        let items = repo.fetch_by_ticker(ticker_id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.sentiment_label.is_none()));
    }

    #[tokio::test]
    async fn test_set_label_is_compare_and_set() {
        let (db, ticker_id) = setup().await;
        let repo = NewsRepository::new(db);

        let id = repo.insert(ticker_id, &story("strong earnings")).await.unwrap();

        assert!(repo.set_label(id, SentimentLabel::Positive).await.unwrap());
        // 두 번째 기록 시도는 no-op — 라벨은 되돌아가거나 바뀌지 않는다
        assert!(!repo.set_label(id, SentimentLabel::Negative).await.unwrap());

        let item = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(item.sentiment_label, Some(SentimentLabel::Positive));
    }

    #[tokio::test]
    async fn test_claim_hides_rows_from_overlapping_claimer() {
        let (db, ticker_id) = setup().await;
        let repo = NewsRepository::new(db);

        let first = repo.insert(ticker_id, &story("strong earnings")).await.unwrap();
        repo.insert(ticker_id, &story("guidance cut")).await.unwrap();

        let claimed = repo.claim_unlabeled(10, 300).await.unwrap();
        assert_eq!(claimed.len(), 2);

        // 유효한 claim이 걸린 기사는 다른 실행이 가져가지 못한다
        assert!(repo.claim_unlabeled(10, 300).await.unwrap().is_empty());

        // 해제된 기사는 바로 다시 claim 가능
        repo.release_claim(first).await.unwrap();
        let reclaimed = repo.claim_unlabeled(10, 300).await.unwrap();
        assert_eq!(reclaimed.len(), 1);
        assert_eq!(reclaimed[0].id, first);
    }

    #[tokio::test]
    async fn test_expired_claim_is_reclaimable() {
        let (db, ticker_id) = setup().await;
        let repo = NewsRepository::new(db);

        repo.insert(ticker_id, &story("strong earnings")).await.unwrap();

        assert_eq!(repo.claim_unlabeled(10, 0).await.unwrap().len(), 1);
        // TTL 0이면 claim이 즉시 만료된 것으로 취급된다
        assert_eq!(repo.claim_unlabeled(10, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_label_clears_claim() {
        let (db, ticker_id) = setup().await;
        let repo = NewsRepository::new(db);

        let id = repo.insert(ticker_id, &story("strong earnings")).await.unwrap();
        let claimed = repo.claim_unlabeled(10, 300).await.unwrap();
        assert_eq!(claimed.len(), 1);

        assert!(repo.set_label(id, SentimentLabel::Positive).await.unwrap());

        // 라벨이 붙은 기사는 claim 대상에서 완전히 빠진다
        assert!(repo.claim_unlabeled(10, 0).await.unwrap().is_empty());
        assert_eq!(repo.count_unlabeled().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fetch_unlabeled_excludes_labeled() {
        let (db, ticker_id) = setup().await;
        let repo = NewsRepository::new(db);

        let first = repo.insert(ticker_id, &story("strong earnings")).await.unwrap();
        repo.insert(ticker_id, &story("guidance cut")).await.unwrap();
        assert_eq!(repo.count_unlabeled().await.unwrap(), 2);

        repo.set_label(first, SentimentLabel::Positive).await.unwrap();

        let unlabeled = repo.fetch_unlabeled(100).await.unwrap();
        assert_eq!(unlabeled.len(), 1);
        assert_eq!(unlabeled[0].description, "guidance cut");
    }
}
