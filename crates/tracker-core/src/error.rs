//! 수집/검증 오류 타입.

use thiserror::Error;

/// 외부 데이터 소스 오류.
///
/// 소스 하나의 실패는 해당 티커 단위에서만 처리되며,
/// 같은 작업의 다른 티커에는 영향을 주지 않습니다.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 네트워크/전송 오류
    #[error("Request failed: {0}")]
    Request(String),

    /// 비정상 HTTP 상태 코드
    #[error("Unexpected status code: {0}")]
    Status(u16),

    /// 응답 파싱 실패
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// 요청 시간 초과
    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

/// 외부 소스가 반환한 행의 필수 필드 누락/형식 오류.
///
/// 해당 행만 건너뛰고 로그로 남깁니다.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 필수 필드 누락
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// 필드 값 형식 오류
    #[error("Invalid field value: {0}")]
    InvalidField(&'static str),
}

impl ValidationError {
    /// 필수 필드 누락 오류 생성.
    pub fn missing(field: &'static str) -> Self {
        ValidationError::MissingField(field)
    }

    /// 형식 오류 생성.
    pub fn invalid(field: &'static str) -> Self {
        ValidationError::InvalidField(field)
    }
}
