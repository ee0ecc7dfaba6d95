//! 뉴스 수집 모듈.
//!
//! 설정된 티커마다 최근 `window_days`일 구간의 기사를 조회해
//! `(ticker, date, description)` 기준으로 중복 없이 저장합니다.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use tracker_core::NewsSource;
use tracker_data::{Database, NewsRepository, TickerRepository};

use crate::config::NewsCollectConfig;
use crate::{CollectionStats, Result};

/// 티커 단건 처리 결과
struct TickerOutcome {
    inserted: usize,
    skipped: usize,
    empty: bool,
    failed: bool,
}

/// 설정된 모든 티커의 최근 기사 수집
pub async fn collect_news(
    db: &Database,
    source: Arc<dyn NewsSource>,
    tickers: &[String],
    config: &NewsCollectConfig,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    let today = Utc::now().date_naive();
    let from = today - ChronoDuration::days(config.window_days);

    let ticker_repo = TickerRepository::new(db.clone());
    let news_repo = NewsRepository::new(db.clone());
    let semaphore = Arc::new(Semaphore::new(config.concurrent_limit.max(1)));
    let fetch_timeout = config.fetch_timeout();

    let mut handles = Vec::with_capacity(tickers.len());
    for symbol in tickers {
        let symbol = symbol.clone();
        let source = source.clone();
        let ticker_repo = ticker_repo.clone();
        let news_repo = news_repo.clone();
        let semaphore = semaphore.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("세마포어 획득 실패");
            collect_one(
                &symbol,
                source.as_ref(),
                &ticker_repo,
                &news_repo,
                from,
                today,
                fetch_timeout,
            )
            .await
        }));
    }

    for handle in handles {
        stats.total += 1;
        match handle.await {
            Ok(outcome) => {
                if outcome.failed {
                    stats.errors += 1;
                } else if outcome.empty {
                    stats.empty += 1;
                } else {
                    stats.success += 1;
                }
                stats.inserted += outcome.inserted;
                stats.skipped += outcome.skipped;
            }
            Err(e) => {
                warn!(error = %e, "뉴스 수집 태스크 비정상 종료");
                stats.errors += 1;
            }
        }
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// 티커 한 개의 기사 구간을 조회하고 저장
async fn collect_one(
    symbol: &str,
    source: &dyn NewsSource,
    tickers: &TickerRepository,
    news: &NewsRepository,
    from: NaiveDate,
    to: NaiveDate,
    fetch_timeout: Duration,
) -> TickerOutcome {
    let failed = TickerOutcome {
        inserted: 0,
        skipped: 0,
        empty: false,
        failed: true,
    };

    let fetched = tokio::time::timeout(fetch_timeout, source.fetch_window(symbol, from, to)).await;
    let stories = match fetched {
        Ok(Ok(stories)) => stories,
        Ok(Err(e)) => {
            warn!(ticker = symbol, error = %e, "뉴스 조회 실패");
            return failed;
        }
        Err(_) => {
            warn!(
                ticker = symbol,
                timeout_secs = fetch_timeout.as_secs(),
                "뉴스 조회 타임아웃"
            );
            return failed;
        }
    };

    if stories.is_empty() {
        debug!(ticker = symbol, "구간 내 기사 없음");
        return TickerOutcome {
            inserted: 0,
            skipped: 0,
            empty: true,
            failed: false,
        };
    }

    let ticker = match tickers.resolve_or_create(symbol).await {
        Ok(ticker) => ticker,
        Err(e) => {
            warn!(ticker = symbol, error = %e, "티커 등록 실패");
            return failed;
        }
    };

    let mut inserted = 0;
    let mut skipped = 0;
    for story in &stories {
        if let Err(e) = story.validate() {
            debug!(ticker = symbol, error = %e, "검증 실패 기사 - 스킵");
            skipped += 1;
            continue;
        }

        match news.insert_if_absent(ticker.id, story).await {
            Ok(true) => inserted += 1,
            Ok(false) => skipped += 1,
            Err(e) => {
                warn!(ticker = symbol, date = %story.date, error = %e, "기사 저장 실패");
                return TickerOutcome {
                    inserted,
                    skipped,
                    empty: false,
                    failed: true,
                };
            }
        }
    }

    debug!(
        ticker = symbol,
        fetched = stories.len(),
        inserted = inserted,
        skipped = skipped,
        "기사 저장 완료"
    );

    TickerOutcome {
        inserted,
        skipped,
        empty: false,
        failed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tracker_core::{FetchError, NewsStory};

    struct FixedNewsSource {
        stories: Vec<NewsStory>,
    }

    #[async_trait]
    impl NewsSource for FixedNewsSource {
        async fn fetch_window(
            &self,
            _ticker: &str,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> std::result::Result<Vec<NewsStory>, FetchError> {
            Ok(self.stories.clone())
        }
    }

    fn config() -> NewsCollectConfig {
        NewsCollectConfig {
            enabled: true,
            interval_secs: 30,
            fetch_timeout_secs: 5,
            concurrent_limit: 4,
            window_days: 7,
        }
    }

    fn story(description: &str) -> NewsStory {
        NewsStory {
            date: Utc::now().date_naive(),
            title: "Apple earnings".to_string(),
            description: description.to_string(),
            content: None,
            source: "newswire".to_string(),
        }
    }

    #[tokio::test]
    async fn test_collect_deduplicates_by_description() {
        let db = Database::connect_in_memory().await.unwrap();
        let source: Arc<dyn NewsSource> = Arc::new(FixedNewsSource {
            stories: vec![
                story("strong earnings"),
                story("guidance cut"),
                story("strong earnings"),
            ],
        });
        let tickers = vec!["AAPL".to_string()];

        let stats = collect_news(&db, source.clone(), &tickers, &config())
            .await
            .unwrap();
        assert_eq!(stats.success, 1);
        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.skipped, 1);

        // 재실행은 전부 중복
        let stats = collect_news(&db, source, &tickers, &config())
            .await
            .unwrap();
        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.skipped, 3);
    }

    #[tokio::test]
    async fn test_invalid_story_skipped_without_failing_run() {
        let db = Database::connect_in_memory().await.unwrap();
        let source: Arc<dyn NewsSource> = Arc::new(FixedNewsSource {
            stories: vec![story("strong earnings"), story("")],
        });
        let tickers = vec!["AAPL".to_string()];

        let stats = collect_news(&db, source, &tickers, &config())
            .await
            .unwrap();
        assert_eq!(stats.success, 1);
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.errors, 0);
    }

    #[tokio::test]
    async fn test_empty_feed_counted_as_empty() {
        let db = Database::connect_in_memory().await.unwrap();
        let source: Arc<dyn NewsSource> = Arc::new(FixedNewsSource { stories: vec![] });
        let tickers = vec!["AAPL".to_string()];

        let stats = collect_news(&db, source, &tickers, &config())
            .await
            .unwrap();
        assert_eq!(stats.empty, 1);
        assert_eq!(stats.inserted, 0);

        // 빈 결과는 티커도 등록하지 않는다
        let registered = TickerRepository::new(db).list().await.unwrap();
        assert!(registered.is_empty());
    }
}
