//! 읽기 API용 요약 조회.
//!
//! 코어 외부의 조회 표면(HTTP API 등)이 사용하는 읽기 전용 쿼리입니다.
//! 티커별 최신 종가와 최신 감성 라벨을 하나의 행으로 묶습니다.

use chrono::NaiveDate;
use sqlx::FromRow;

use crate::error::Result;
use crate::storage::sqlite::Database;

/// 티커 현황 행: 최신 종가 + 최신 감성 라벨.
#[derive(Debug, Clone, FromRow)]
pub struct TickerOverviewRow {
    pub symbol: String,
    pub close: Option<f64>,
    pub sentiment_label: Option<String>,
}

/// 감성 피드 행: 기사와 티커, 라벨.
#[derive(Debug, Clone, FromRow)]
pub struct SentimentFeedRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub description: String,
    pub source: String,
    pub sentiment_label: Option<String>,
}

/// 요약 조회 접근.
#[derive(Clone)]
pub struct SummaryRepository {
    db: Database,
}

impl SummaryRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 전체 티커 현황: 최신 종가와 가장 최근 기사의 감성 라벨.
    ///
    /// 시세가 아직 없는 티커는 제외됩니다.
    pub async fn ticker_overview(&self) -> Result<Vec<TickerOverviewRow>> {
        let rows: Vec<TickerOverviewRow> = sqlx::query_as(
            r#"
            SELECT t.symbol, p.close, (
                SELECT n.sentiment_label
                FROM news_items n
                WHERE n.ticker_id = t.id
                ORDER BY n.date DESC, n.id DESC
                LIMIT 1
            ) AS sentiment_label
            FROM tickers t
            JOIN price_points p ON t.id = p.ticker_id
            WHERE p.date = (
                SELECT MAX(date) FROM price_points WHERE ticker_id = t.id
            )
            ORDER BY t.symbol
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows)
    }

    /// 감성 피드: 모든 기사를 최신순으로, 티커 심볼과 함께.
    pub async fn sentiment_feed(&self) -> Result<Vec<SentimentFeedRow>> {
        let rows: Vec<SentimentFeedRow> = sqlx::query_as(
            r#"
            SELECT t.symbol, n.date, n.description, n.source, n.sentiment_label
            FROM news_items n
            JOIN tickers t ON n.ticker_id = t.id
            ORDER BY n.date DESC, n.id DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::news::NewsRepository;
    use crate::storage::price::PriceRepository;
    use crate::storage::ticker::TickerRepository;
    use tracker_core::{NewsStory, Quote, SentimentLabel};

    #[tokio::test]
    async fn test_overview_uses_latest_price_and_label() {
        let db = Database::connect_in_memory().await.unwrap();
        let tickers = TickerRepository::new(db.clone());
        let prices = PriceRepository::new(db.clone());
        let news = NewsRepository::new(db.clone());
        let summary = SummaryRepository::new(db);

        let aapl = tickers.resolve_or_create("AAPL").await.unwrap();
        for (day, close) in [(2, 150.0), (3, 152.5)] {
            prices
                .insert(
                    aapl.id,
                    &Quote {
                        date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                        close,
                        volume: 1000,
                    },
                )
                .await
                .unwrap();
        }

        let news_id = news
            .insert(
                aapl.id,
                &NewsStory {
                    date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                    title: "Apple earnings".to_string(),
                    description: "strong earnings".to_string(),
                    content: None,
                    source: "newswire".to_string(),
                },
            )
            .await
            .unwrap();
        news.set_label(news_id, SentimentLabel::Positive)
            .await
            .unwrap();

        let overview = summary.ticker_overview().await.unwrap();
        assert_eq!(overview.len(), 1);
        assert_eq!(overview[0].symbol, "AAPL");
        assert_eq!(overview[0].close, Some(152.5));
        assert_eq!(overview[0].sentiment_label.as_deref(), Some("positive"));

        let feed = summary.sentiment_feed().await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].source, "newswire");
    }
}
