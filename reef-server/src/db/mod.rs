//! Database Module
//!
//! Embedded SurrealDB storage (RocksDB engine) and schema definition.

pub mod models;
pub mod repository;

use shared::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Database service, owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the embedded database at the given path
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns("reef")
            .use_db("storefront")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database ready at {}", db_path);

        Ok(Self { db })
    }
}

/// Apply idempotent schema definitions
///
/// Public so the integration tests can run the same schema against the
/// in-memory engine.
pub async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        "
        DEFINE INDEX IF NOT EXISTS idx_user_email ON TABLE user COLUMNS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_variant_product ON TABLE product_variant COLUMNS product_id;
        DEFINE INDEX IF NOT EXISTS idx_item_order ON TABLE order_item COLUMNS order_id;
        DEFINE INDEX IF NOT EXISTS idx_order_user ON TABLE order COLUMNS user_id, status_id;
        ",
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?
    .check()
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;

    Ok(())
}
