//! 시세 수집 모듈.
//!
//! 설정된 티커마다 외부 소스에서 최신 종가를 조회해 저장합니다.
//! 티커별 조회는 Semaphore로 동시 실행 수를 제한하고, 조회당
//! 타임아웃을 걸어 느린 외부 응답이 전체 실행을 붙잡지 않게 합니다.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{debug, warn};
use tracker_core::{Interval, PriceSource, Quote};
use tracker_data::{Database, PriceRepository, TickerRepository};

use crate::config::PriceCollectConfig;
use crate::{CollectionStats, Result};

/// 티커 단건 처리 결과
enum Outcome {
    /// 새 시세 저장
    Inserted,
    /// 이미 저장된 시세 (데이터 최신)
    Duplicate,
    /// 조회 성공, 시세 없음
    Empty,
    /// 검증 실패로 건너뜀
    Invalid,
    /// 조회 또는 저장 실패
    Failed,
}

/// 설정된 모든 티커의 최신 시세 수집
pub async fn collect_prices(
    db: &Database,
    source: Arc<dyn PriceSource>,
    tickers: &[String],
    config: &PriceCollectConfig,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    let ticker_repo = TickerRepository::new(db.clone());
    let price_repo = PriceRepository::new(db.clone());
    let semaphore = Arc::new(Semaphore::new(config.concurrent_limit.max(1)));
    let fetch_timeout = config.fetch_timeout();

    let mut handles = Vec::with_capacity(tickers.len());
    for symbol in tickers {
        let symbol = symbol.clone();
        let source = source.clone();
        let ticker_repo = ticker_repo.clone();
        let price_repo = price_repo.clone();
        let semaphore = semaphore.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("세마포어 획득 실패");
            collect_one(
                &symbol,
                source.as_ref(),
                &ticker_repo,
                &price_repo,
                fetch_timeout,
            )
            .await
        }));
    }

    for handle in handles {
        stats.total += 1;
        match handle.await {
            Ok(Outcome::Inserted) => {
                stats.success += 1;
                stats.inserted += 1;
            }
            // 이미 저장된 시세는 멱등 no-op
            Ok(Outcome::Duplicate) => stats.skipped += 1,
            Ok(Outcome::Empty) => stats.empty += 1,
            Ok(Outcome::Invalid) => stats.skipped += 1,
            Ok(Outcome::Failed) => stats.errors += 1,
            Err(e) => {
                warn!(error = %e, "시세 수집 태스크 비정상 종료");
                stats.errors += 1;
            }
        }
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// 티커 한 개의 최신 시세를 조회하고 저장
async fn collect_one(
    symbol: &str,
    source: &dyn PriceSource,
    tickers: &TickerRepository,
    prices: &PriceRepository,
    fetch_timeout: Duration,
) -> Outcome {
    let fetched =
        tokio::time::timeout(fetch_timeout, source.fetch_latest(symbol, Interval::D1)).await;

    let quote = match fetched {
        Ok(Ok(Some(quote))) => quote,
        Ok(Ok(None)) => {
            debug!(ticker = symbol, "시세 없음");
            return Outcome::Empty;
        }
        Ok(Err(e)) => {
            warn!(ticker = symbol, error = %e, "시세 조회 실패");
            return Outcome::Failed;
        }
        Err(_) => {
            warn!(
                ticker = symbol,
                timeout_secs = fetch_timeout.as_secs(),
                "시세 조회 타임아웃"
            );
            return Outcome::Failed;
        }
    };

    if !is_valid_quote(&quote) {
        warn!(
            ticker = symbol,
            close = quote.close,
            volume = quote.volume,
            "비정상 시세 - 스킵"
        );
        return Outcome::Invalid;
    }

    let ticker = match tickers.resolve_or_create(symbol).await {
        Ok(ticker) => ticker,
        Err(e) => {
            warn!(ticker = symbol, error = %e, "티커 등록 실패");
            return Outcome::Failed;
        }
    };

    match prices.insert_if_absent(ticker.id, &quote).await {
        Ok(true) => {
            debug!(
                ticker = symbol,
                date = %quote.date,
                close = quote.close,
                "시세 저장"
            );
            Outcome::Inserted
        }
        Ok(false) => Outcome::Duplicate,
        Err(e) => {
            warn!(ticker = symbol, error = %e, "시세 저장 실패");
            Outcome::Failed
        }
    }
}

/// 저장 전 시세 검증
fn is_valid_quote(quote: &Quote) -> bool {
    quote.close.is_finite() && quote.close > 0.0 && quote.volume >= 0
}
