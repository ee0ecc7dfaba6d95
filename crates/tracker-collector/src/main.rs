//! Standalone ticker tracker CLI.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracker_collector::{modules, CollectorConfig, CollectorError};
use tracker_core::{NewsSource, PriceSource, SentimentClassifier};
use tracker_data::{
    Database, DatabaseConfig, HttpSentimentClassifier, SummaryRepository, TickerTickClient,
    YahooChartClient,
};

#[derive(Parser)]
#[command(name = "tracker-collector")]
#[command(about = "시세·뉴스 수집 및 감성 분석 파이프라인", long_about = None)]
struct Cli {
    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 최신 시세 1회 수집
    CollectPrices,

    /// 최근 기사 1회 수집
    CollectNews {
        /// 수집 구간 (일), 설정값 대신 사용
        #[arg(long)]
        window_days: Option<i64>,
    },

    /// 라벨 없는 기사 1회 분류
    EnrichSentiment,

    /// 세 작업을 순서대로 1회 실행 (시세 → 뉴스 → 감성)
    RunAll,

    /// 티커 현황 출력 (최신 종가 + 최신 감성 라벨)
    Overview,

    /// 감성 피드 출력 (기사 최신순)
    Feed,

    /// 데몬 모드: 작업별 주기 실행
    Daemon,
}

/// 시세·뉴스·감성 순차 1회 실행
async fn run_all(
    db: &Database,
    config: &CollectorConfig,
    price_source: Arc<dyn PriceSource>,
    news_source: Arc<dyn NewsSource>,
    classifier: Arc<dyn SentimentClassifier>,
) {
    match modules::collect_prices(db, price_source, &config.tickers, &config.price_collect).await {
        Ok(stats) => stats.log_summary("시세 수집"),
        Err(e) => tracing::error!("시세 수집 실패: {}", e),
    }

    match modules::collect_news(db, news_source, &config.tickers, &config.news_collect).await {
        Ok(stats) => stats.log_summary("뉴스 수집"),
        Err(e) => tracing::error!("뉴스 수집 실패: {}", e),
    }

    match modules::enrich_sentiment(db, classifier, &config.enrich).await {
        Ok(stats) => stats.log_summary("감성 분석"),
        Err(e) => tracing::error!("감성 분석 실패: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화 (tracker_collector, tracker_data 모두 포함)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "tracker_collector={},tracker_data={}",
                    cli.log_level, cli.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Ticker Tracker 시작");

    // 설정 로드
    let mut config = CollectorConfig::from_env()?;
    tracing::debug!(
        database_path = %config.database_path,
        tickers = ?config.tickers,
        "설정 로드 완료"
    );

    // DB 연결 (단일 쓰기 커넥션, 스키마 초기화 포함)
    let db_config = DatabaseConfig {
        path: config.database_path.clone(),
        ..Default::default()
    };
    let db = Database::connect(&db_config)
        .await
        .map_err(|e| CollectorError::Config(format!("데이터베이스 연결 실패: {}", e)))?;

    let price_source: Arc<dyn PriceSource> = Arc::new(YahooChartClient::new());
    let news_source: Arc<dyn NewsSource> = Arc::new(TickerTickClient::new());
    let classifier: Arc<dyn SentimentClassifier> =
        Arc::new(HttpSentimentClassifier::new(&config.enrich.classifier_url));

    // 명령 실행
    match cli.command {
        Commands::CollectPrices => {
            let stats =
                modules::collect_prices(&db, price_source, &config.tickers, &config.price_collect)
                    .await?;
            stats.log_summary("시세 수집");
        }
        Commands::CollectNews { window_days } => {
            if let Some(days) = window_days {
                config.news_collect.window_days = days;
            }
            let stats =
                modules::collect_news(&db, news_source, &config.tickers, &config.news_collect)
                    .await?;
            stats.log_summary("뉴스 수집");
        }
        Commands::EnrichSentiment => {
            let stats = modules::enrich_sentiment(&db, classifier, &config.enrich).await?;
            stats.log_summary("감성 분석");
        }
        Commands::RunAll => {
            run_all(&db, &config, price_source, news_source, classifier).await;
        }
        Commands::Overview => {
            let rows = SummaryRepository::new(db.clone()).ticker_overview().await?;
            for row in rows {
                println!(
                    "{}\t{}\t{}",
                    row.symbol,
                    row.close.map_or("-".to_string(), |c| format!("{:.2}", c)),
                    row.sentiment_label.as_deref().unwrap_or("-"),
                );
            }
        }
        Commands::Feed => {
            let rows = SummaryRepository::new(db.clone()).sentiment_feed().await?;
            for row in rows {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    row.date,
                    row.symbol,
                    row.sentiment_label.as_deref().unwrap_or("-"),
                    row.source,
                    row.description,
                );
            }
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 ===\n  \
                 [시세] {}초 주기 (enabled: {})\n  \
                 [뉴스] {}초 주기 (enabled: {})\n  \
                 [감성] {}초 주기 (enabled: {})",
                config.price_collect.interval_secs,
                config.price_collect.enabled,
                config.news_collect.interval_secs,
                config.news_collect.enabled,
                config.enrich.interval_secs,
                config.enrich.enabled,
            );

            let mut scheduler = modules::Scheduler::new();

            if config.price_collect.enabled {
                let period = config.price_collect.interval();
                let db = db.clone();
                let source = price_source.clone();
                let tickers = config.tickers.clone();
                let job_config = config.price_collect.clone();
                scheduler.spawn_job("price_collect", period, move || {
                    let db = db.clone();
                    let source = source.clone();
                    let tickers = tickers.clone();
                    let job_config = job_config.clone();
                    async move {
                        match modules::collect_prices(&db, source, &tickers, &job_config).await {
                            Ok(stats) => stats.log_summary("시세 수집"),
                            Err(e) => tracing::error!("시세 수집 실패: {}", e),
                        }
                    }
                });
            }

            if config.news_collect.enabled {
                let period = config.news_collect.interval();
                let db = db.clone();
                let source = news_source.clone();
                let tickers = config.tickers.clone();
                let job_config = config.news_collect.clone();
                scheduler.spawn_job("news_collect", period, move || {
                    let db = db.clone();
                    let source = source.clone();
                    let tickers = tickers.clone();
                    let job_config = job_config.clone();
                    async move {
                        match modules::collect_news(&db, source, &tickers, &job_config).await {
                            Ok(stats) => stats.log_summary("뉴스 수집"),
                            Err(e) => tracing::error!("뉴스 수집 실패: {}", e),
                        }
                    }
                });
            }

            if config.enrich.enabled {
                let period = config.enrich.interval();
                let db = db.clone();
                let classifier = classifier.clone();
                let job_config = config.enrich.clone();
                scheduler.spawn_job("sentiment_enrich", period, move || {
                    let db = db.clone();
                    let classifier = classifier.clone();
                    let job_config = job_config.clone();
                    async move {
                        match modules::enrich_sentiment(&db, classifier, &job_config).await {
                            Ok(stats) => stats.log_summary("감성 분석"),
                            Err(e) => tracing::error!("감성 분석 실패: {}", e),
                        }
                    }
                });
            }

            // Ctrl+C 대기 후 종료 시그널 전송
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("종료 신호 수신, 데몬 종료 중...");
            scheduler.shutdown().await;
        }
    }

    db.close().await;
    tracing::info!("Ticker Tracker 종료");

    Ok(())
}
