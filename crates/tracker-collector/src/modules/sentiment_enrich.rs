//! 감성 분석 모듈.
//!
//! 라벨이 없는 기사 배치를 먼저 claim으로 차지한 뒤 외부 분류
//! 서비스에 보내고, 결과 라벨을 compare-and-set으로 기록합니다.
//! claim 덕분에 겹치는 실행(데몬 + 단발 CLI)이 같은 기사를 두 번
//! 분류하지 않으며, 이미 라벨이 붙은 기사는 절대 덮어쓰지 않습니다.
//! 분류에 실패한 기사는 claim을 해제해 다음 실행에서 재시도합니다.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};
use tracker_core::SentimentClassifier;
use tracker_data::{Database, NewsRepository};

use crate::config::EnrichConfig;
use crate::{CollectionStats, Result};

/// 라벨 없는 기사 배치 분류 및 라벨 기록
pub async fn enrich_sentiment(
    db: &Database,
    classifier: Arc<dyn SentimentClassifier>,
    config: &EnrichConfig,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    let news = NewsRepository::new(db.clone());
    let batch = news
        .claim_unlabeled(config.batch_size, config.claim_ttl_secs)
        .await?;
    if batch.is_empty() {
        debug!("분석 대기 기사 없음");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let fetch_timeout = config.fetch_timeout();
    for row in batch {
        stats.total += 1;

        let label = match tokio::time::timeout(fetch_timeout, classifier.classify(&row.description))
            .await
        {
            Ok(Ok(label)) => label,
            Ok(Err(e)) => {
                warn!(news_id = row.id, error = %e, "감성 분류 실패");
                stats.errors += 1;
                release_claim(&news, row.id).await;
                continue;
            }
            Err(_) => {
                warn!(
                    news_id = row.id,
                    timeout_secs = fetch_timeout.as_secs(),
                    "감성 분류 타임아웃"
                );
                stats.errors += 1;
                release_claim(&news, row.id).await;
                continue;
            }
        };

        match news.set_label(row.id, label).await {
            Ok(true) => {
                debug!(news_id = row.id, label = %label, "라벨 기록");
                stats.success += 1;
                stats.inserted += 1;
            }
            // 겹치는 실행이 먼저 라벨을 기록한 경우
            Ok(false) => stats.skipped += 1,
            Err(e) => {
                warn!(news_id = row.id, error = %e, "라벨 기록 실패");
                stats.errors += 1;
            }
        }
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// 분류 실패 기사의 claim 해제 (best-effort)
async fn release_claim(news: &NewsRepository, id: i64) {
    if let Err(e) = news.release_claim(id).await {
        warn!(news_id = id, error = %e, "claim 해제 실패");
    }
}
