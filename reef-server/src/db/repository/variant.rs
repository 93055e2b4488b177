//! Product Variant Repository
//!
//! Variant reconciliation (the combination generator's write path) runs as a
//! single transaction: update matching SKUs, create missing ones, soft-delete
//! the rest.

use super::{BaseRepository, RepoError, RepoResult, now_millis, record_key, record_ref};
use crate::db::models::{ProductVariant, VariantAttribute};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const VARIANT_TABLE: &str = "product_variant";

/// One variant to create during reconciliation
#[derive(Debug, Clone)]
pub struct VariantSeed {
    pub sku: String,
    pub attributes: Vec<VariantAttribute>,
}

/// Per-variant patch for the batch update endpoint
#[derive(Debug, Clone, serde::Deserialize)]
pub struct VariantPatch {
    pub id: String,
    pub stock: Option<i64>,
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
}

#[derive(Clone)]
pub struct VariantRepository {
    base: BaseRepository,
}

impl VariantRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Live variants of a product
    pub async fn find_by_product(&self, product_id: &str) -> RepoResult<Vec<ProductVariant>> {
        let variants: Vec<ProductVariant> = self
            .base
            .db()
            .query(
                "SELECT * FROM product_variant \
                 WHERE product_id = $product AND deleted_at IS NONE ORDER BY sku",
            )
            .bind(("product", record_ref("product", product_id)))
            .await?
            .take(0)?;
        Ok(variants)
    }

    /// Find a variant by id, including soft-deleted ones
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<ProductVariant>> {
        let pure_id = record_key(VARIANT_TABLE, id);
        let variant: Option<ProductVariant> =
            self.base.db().select((VARIANT_TABLE, pure_id)).await?;
        Ok(variant)
    }

    /// Find a live variant by id
    pub async fn find_active_by_id(&self, id: &str) -> RepoResult<Option<ProductVariant>> {
        Ok(self
            .find_by_id(id)
            .await?
            .filter(|v| v.deleted_at.is_none()))
    }

    /// Reconcile the variant set of a product against the generated SKUs,
    /// in one transaction:
    /// - `to_update`: existing SKUs, stock/price overwritten in place
    /// - `to_create`: new SKUs, created with their attribute pairs
    /// - `to_delete`: stale SKUs, soft-deleted
    pub async fn reconcile(
        &self,
        product_id: &str,
        to_update: &[String],
        to_create: &[VariantSeed],
        to_delete: &[String],
        stock: i64,
        price: f64,
    ) -> RepoResult<()> {
        let product_ref = record_ref("product", product_id);

        let mut script = String::from("BEGIN TRANSACTION;\n");
        for i in 0..to_update.len() {
            script.push_str(&format!(
                "UPDATE product_variant SET stock = $stock, price = $price \
                 WHERE product_id = $product AND sku = $upd_{i} AND deleted_at IS NONE;\n"
            ));
        }
        for i in 0..to_create.len() {
            script.push_str(&format!(
                "CREATE product_variant CONTENT {{ \
                 product_id: $product, sku: $new_sku_{i}, stock: $stock, price: $price, \
                 thumbnail: NONE, attributes: $new_attrs_{i}, deleted_at: NONE }};\n"
            ));
        }
        for i in 0..to_delete.len() {
            script.push_str(&format!(
                "UPDATE product_variant SET deleted_at = $ts \
                 WHERE product_id = $product AND sku = $del_{i} AND deleted_at IS NONE;\n"
            ));
        }
        script.push_str("COMMIT TRANSACTION;");

        let mut query = self
            .base
            .db()
            .query(script)
            .bind(("product", product_ref))
            .bind(("stock", stock))
            .bind(("price", price))
            .bind(("ts", now_millis()));

        for (i, sku) in to_update.iter().enumerate() {
            query = query.bind((format!("upd_{i}"), sku.clone()));
        }
        for (i, seed) in to_create.iter().enumerate() {
            query = query.bind((format!("new_sku_{i}"), seed.sku.clone()));
            query = query.bind((format!("new_attrs_{i}"), seed.attributes.clone()));
        }
        for (i, sku) in to_delete.iter().enumerate() {
            query = query.bind((format!("del_{i}"), sku.clone()));
        }

        query.await?.check()?;
        Ok(())
    }

    /// Apply per-variant stock/price/thumbnail patches.
    ///
    /// Unknown variant ids are skipped, not errors.
    pub async fn apply_patches(&self, patches: &[VariantPatch]) -> RepoResult<usize> {
        let mut updated = 0;

        for patch in patches {
            let mut set_parts: Vec<&str> = Vec::new();
            if patch.stock.is_some() {
                set_parts.push("stock = $stock");
            }
            if patch.price.is_some() {
                set_parts.push("price = $price");
            }
            if patch.thumbnail.is_some() {
                set_parts.push("thumbnail = $thumbnail");
            }
            if set_parts.is_empty() {
                continue;
            }

            let thing = surrealdb::RecordId::from_table_key(
                VARIANT_TABLE,
                record_key(VARIANT_TABLE, &patch.id),
            );
            let query_str = format!(
                "UPDATE $thing SET {} WHERE deleted_at IS NONE RETURN AFTER",
                set_parts.join(", ")
            );

            let mut query = self.base.db().query(&query_str).bind(("thing", thing));
            if let Some(v) = patch.stock {
                query = query.bind(("stock", v));
            }
            if let Some(v) = patch.price {
                query = query.bind(("price", v));
            }
            if let Some(v) = patch.thumbnail.clone() {
                query = query.bind(("thumbnail", v));
            }

            let hit: Vec<ProductVariant> = query.await?.take(0)?;
            if !hit.is_empty() {
                updated += 1;
            }
        }

        Ok(updated)
    }

    /// Soft-delete a single variant, scoped to its product
    pub async fn soft_delete(&self, product_id: &str, variant_id: &str) -> RepoResult<()> {
        let thing = surrealdb::RecordId::from_table_key(
            VARIANT_TABLE,
            record_key(VARIANT_TABLE, variant_id),
        );

        let hit: Vec<ProductVariant> = self
            .base
            .db()
            .query(
                "UPDATE $thing SET deleted_at = $ts \
                 WHERE product_id = $product AND deleted_at IS NONE RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("product", record_ref("product", product_id)))
            .bind(("ts", now_millis()))
            .await?
            .take(0)?;

        if hit.is_empty() {
            return Err(RepoError::NotFound(format!(
                "Variant {} not found",
                variant_id
            )));
        }
        Ok(())
    }
}
