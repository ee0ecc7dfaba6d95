//! SQLite 저장소 구현.

pub mod news;
pub mod price;
pub mod sqlite;
pub mod summary;
pub mod ticker;
