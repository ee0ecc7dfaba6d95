//! 데이터 수집 모듈.

pub mod news_collect;
pub mod price_collect;
pub mod scheduler;
pub mod sentiment_enrich;

pub use news_collect::collect_news;
pub use price_collect::collect_prices;
pub use scheduler::Scheduler;
pub use sentiment_enrich::enrich_sentiment;
