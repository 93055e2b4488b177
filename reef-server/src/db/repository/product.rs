//! Product Repository

use super::{BaseRepository, RepoError, RepoResult, now_millis, record_key, record_ref};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const PRODUCT_TABLE: &str = "product";

/// Catalog listing filters (all optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    /// Substring match against name/description
    pub search: Option<String>,
    pub status: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// One of: name, price, view, created_at
    pub sort_by: Option<String>,
    /// asc | desc (default desc)
    pub sort_order: Option<String>,
}

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find live products matching the given filters
    pub async fn find_all(&self, filter: &ProductQuery) -> RepoResult<Vec<Product>> {
        let mut where_parts = vec!["deleted_at IS NONE"];

        if filter.search.is_some() {
            where_parts.push("(name CONTAINS $search OR description CONTAINS $search)");
        }
        if filter.status.is_some() {
            where_parts.push("status = $status");
        }
        if filter.min_price.is_some() {
            where_parts.push("price >= $min_price");
        }
        if filter.max_price.is_some() {
            where_parts.push("price <= $max_price");
        }

        // Sort field is whitelisted; anything else falls back to created_at
        let sort_by = match filter.sort_by.as_deref() {
            Some("name") => "name",
            Some("price") => "price",
            Some("view") => "view",
            _ => "created_at",
        };
        let sort_order = match filter.sort_order.as_deref() {
            Some("asc") => "ASC",
            _ => "DESC",
        };

        let query_str = format!(
            "SELECT * FROM product WHERE {} ORDER BY {} {}",
            where_parts.join(" AND "),
            sort_by,
            sort_order
        );

        let mut query = self.base.db().query(&query_str);
        if let Some(search) = &filter.search {
            query = query.bind(("search", search.clone()));
        }
        if let Some(status) = &filter.status {
            query = query.bind(("status", status.clone()));
        }
        if let Some(min) = filter.min_price {
            query = query.bind(("min_price", min));
        }
        if let Some(max) = filter.max_price {
            query = query.bind(("max_price", max));
        }

        let products: Vec<Product> = query.await?.take(0)?;
        Ok(products)
    }

    /// Find a product by id, including soft-deleted ones
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let pure_id = record_key(PRODUCT_TABLE, id);
        let product: Option<Product> = self.base.db().select((PRODUCT_TABLE, pure_id)).await?;
        Ok(product)
    }

    /// Find a live (not soft-deleted) product by id
    pub async fn find_active_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        Ok(self
            .find_by_id(id)
            .await?
            .filter(|p| p.deleted_at.is_none()))
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let now = now_millis();
        let product = Product {
            id: None,
            name: data.name,
            description: data.description,
            price: data.price,
            price_old: data.price_old,
            quantity: data.quantity.unwrap_or(0),
            view: 0,
            promotion: data.promotion,
            status: data.status,
            images: data.images.unwrap_or_default(),
            deleted_at: None,
            created_at: Some(now),
            updated_at: Some(now),
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product (dynamic SET clauses, only the provided fields)
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let pure_id = record_key(PRODUCT_TABLE, id);
        let thing = surrealdb::RecordId::from_table_key(PRODUCT_TABLE, pure_id);

        let mut set_parts: Vec<&str> = Vec::new();

        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.price_old.is_some() {
            set_parts.push("price_old = $price_old");
        }
        if data.quantity.is_some() {
            set_parts.push("quantity = $quantity");
        }
        if data.promotion.is_some() {
            set_parts.push("promotion = $promotion");
        }
        if data.status.is_some() {
            set_parts.push("status = $status");
        }
        if data.images.is_some() {
            set_parts.push("images = $images");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(pure_id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }

        set_parts.push("updated_at = $updated_at");

        let query_str = format!(
            "UPDATE $thing SET {} RETURN AFTER",
            set_parts.join(", ")
        );

        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("thing", thing))
            .bind(("updated_at", now_millis()));

        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.price_old {
            query = query.bind(("price_old", v));
        }
        if let Some(v) = data.quantity {
            query = query.bind(("quantity", v));
        }
        if let Some(v) = data.promotion {
            query = query.bind(("promotion", v));
        }
        if let Some(v) = data.status {
            query = query.bind(("status", v));
        }
        if let Some(v) = data.images {
            query = query.bind(("images", v));
        }

        let updated: Vec<Product> = query.await?.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Soft-delete a product and its variants in one transaction
    pub async fn soft_delete(&self, id: &str) -> RepoResult<()> {
        let thing =
            surrealdb::RecordId::from_table_key(PRODUCT_TABLE, record_key(PRODUCT_TABLE, id));
        let product_ref = record_ref(PRODUCT_TABLE, id);

        self.base
            .db()
            .query(
                "
                BEGIN TRANSACTION;
                UPDATE $thing SET deleted_at = $ts, updated_at = $ts WHERE deleted_at IS NONE;
                UPDATE product_variant SET deleted_at = $ts WHERE product_id = $product AND deleted_at IS NONE;
                COMMIT TRANSACTION;
                ",
            )
            .bind(("thing", thing))
            .bind(("product", product_ref))
            .bind(("ts", now_millis()))
            .await?
            .check()?;

        Ok(())
    }

    /// Restore a soft-deleted product and its variants
    pub async fn restore(&self, id: &str) -> RepoResult<()> {
        let thing =
            surrealdb::RecordId::from_table_key(PRODUCT_TABLE, record_key(PRODUCT_TABLE, id));
        let product_ref = record_ref(PRODUCT_TABLE, id);

        self.base
            .db()
            .query(
                "
                BEGIN TRANSACTION;
                UPDATE $thing SET deleted_at = NONE, updated_at = $ts;
                UPDATE product_variant SET deleted_at = NONE WHERE product_id = $product;
                COMMIT TRANSACTION;
                ",
            )
            .bind(("thing", thing))
            .bind(("product", product_ref))
            .bind(("ts", now_millis()))
            .await?
            .check()?;

        Ok(())
    }

    /// Bump the detail page view counter
    pub async fn increment_view(&self, id: &str) -> RepoResult<()> {
        let thing =
            surrealdb::RecordId::from_table_key(PRODUCT_TABLE, record_key(PRODUCT_TABLE, id));

        self.base
            .db()
            .query("UPDATE $thing SET view += 1")
            .bind(("thing", thing))
            .await?
            .check()?;

        Ok(())
    }
}
