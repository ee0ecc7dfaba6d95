//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 중복 레코드 (UNIQUE 제약 위반)
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// 참조 무결성 위반 (FOREIGN KEY 제약)
    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    /// 연결 풀이 닫힘 (close 이후 접근)
    #[error("Connection pool is closed")]
    PoolClosed,

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolClosed => DataError::PoolClosed,
            sqlx::Error::Database(db_err) => match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    DataError::Duplicate(db_err.message().to_string())
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    DataError::ForeignKey(db_err.message().to_string())
                }
                _ => DataError::QueryError(db_err.message().to_string()),
            },
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
