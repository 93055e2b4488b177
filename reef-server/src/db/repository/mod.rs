//! Repository Module
//!
//! CRUD operations over the embedded SurrealDB tables. Multi-row mutations
//! (cart line upsert, checkout, variant reconciliation) run as single
//! `BEGIN TRANSACTION … COMMIT TRANSACTION` scripts so concurrent requests
//! cannot observe partial writes.

pub mod attribute;
pub mod order;
pub mod product;
pub mod user;
pub mod variant;

pub use attribute::AttributeRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use user::UserRepository;
pub use variant::VariantRepository;

use shared::{AppError, ErrorCode};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A conditional stock decrement failed inside a checkout transaction
    #[error("Insufficient stock")]
    InsufficientStock,
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // Conditional stock updates signal failure with THROW; surface it as
        // its own variant so the API can answer 400 instead of 500.
        if msg.contains("INSUFFICIENT_STOCK") {
            RepoError::InsufficientStock
        } else {
            RepoError::Database(msg)
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::InsufficientStock => AppError::new(ErrorCode::InsufficientStock),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Surface the statement errors of a multi-statement response.
///
/// When a transaction is cancelled by a THROW, the statements before the
/// throwing one report a generic cancellation error; every slot has to be
/// scanned to find the real cause.
pub(crate) fn collect_errors(response: &mut surrealdb::Response) -> RepoResult<()> {
    let errors = response.take_errors();
    if errors.is_empty() {
        return Ok(());
    }
    if errors
        .values()
        .any(|e| e.to_string().contains("INSUFFICIENT_STOCK"))
    {
        return Err(RepoError::InsufficientStock);
    }
    let message = errors
        .into_values()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    Err(RepoError::Database(message))
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

// =============================================================================
// ID Convention: 全栈统一使用 "table:key" 格式
// =============================================================================
//
// 链接字段以 "table:key" 字符串存储，查询时绑定字符串即可比较；
// 记录主键使用 surrealdb::RecordId：
//   - 解析: let id: RecordId = "product:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("product", "abc");
//   - CRUD: db.select((table, key)) / db.delete((table, key))

/// Strip the "table:" prefix from an id if present, returning the bare key.
pub fn record_key<'a>(table: &str, id: &'a str) -> &'a str {
    id.strip_prefix(table)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(id)
}

/// Build the canonical "table:key" string form of an id.
pub fn record_ref(table: &str, id: &str) -> String {
    format!("{}:{}", table, record_key(table, id))
}

/// Current unix timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
