//! 외부 데이터 소스 클라이언트.
//!
//! 각 클라이언트는 `tracker-core`의 소스 trait를 구현하며,
//! 수집 파이프라인은 구체 타입이 아닌 trait에만 의존합니다.

pub mod classifier;
pub mod tickertick;
pub mod yahoo;

use tracker_core::FetchError;

/// reqwest 오류를 FetchError로 변환.
pub(crate) fn request_error(err: reqwest::Error, timeout_secs: u64) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(timeout_secs)
    } else {
        FetchError::Request(err.to_string())
    }
}
