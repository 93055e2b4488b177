//! Cart decision logic shared by both store implementations
//!
//! Product/variant resolution, belongs-to checks, stock validation and price
//! snapshotting happen here; the [`CartStore`] only moves validated data.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::ephemeral::EphemeralCartStore;
use super::persistent::PersistentCartStore;
use super::session::SessionStore;
use super::store::{CartStore, CartView, NewLine, ProductSummary, VariantSummary};
use crate::auth::Caller;
use crate::db::models::{Product, ProductVariant};
use crate::db::repository::{ProductRepository, VariantRepository};
use crate::utils::validation::validate_quantity;
use shared::{AppError, AppResult, ErrorCode};

/// The stock available to a cart line: the variant's stock when a variant is
/// selected, otherwise the product's own quantity.
pub fn available_stock(product_quantity: i64, variant_stock: Option<i64>) -> i64 {
    variant_stock.unwrap_or(product_quantity)
}

/// The unit price snapshotted onto a cart line: the variant's price when a
/// variant is selected, otherwise the product's price.
pub fn unit_price(product_price: f64, variant_price: Option<f64>) -> f64 {
    variant_price.unwrap_or(product_price)
}

pub struct CartService {
    db: Surreal<Db>,
    sessions: SessionStore,
}

impl CartService {
    pub fn new(db: Surreal<Db>, sessions: SessionStore) -> Self {
        Self { db, sessions }
    }

    /// Build the cart store for the resolved request identity.
    ///
    /// An anonymous caller without a session gets a fresh session id; the id
    /// is only materialized in the session store once something is added.
    pub fn store_for(&self, caller: &Caller) -> Box<dyn CartStore> {
        match caller {
            Caller::User(user) => Box::new(PersistentCartStore::new(
                self.db.clone(),
                user.id.clone(),
            )),
            Caller::Guest { session } => {
                let session_id = session
                    .clone()
                    .unwrap_or_else(SessionStore::new_session_id);
                Box::new(EphemeralCartStore::new(self.sessions.clone(), session_id))
            }
        }
    }

    async fn resolve_product(&self, product_id: &str) -> AppResult<Product> {
        ProductRepository::new(self.db.clone())
            .find_active_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))
    }

    async fn resolve_variant(
        &self,
        product: &Product,
        variant_id: &str,
    ) -> AppResult<ProductVariant> {
        let variant = VariantRepository::new(self.db.clone())
            .find_active_by_id(variant_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::VariantNotFound))?;

        let product_ref = product.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
        if variant.product_id.to_string() != product_ref {
            return Err(AppError::new(ErrorCode::VariantMismatch));
        }
        Ok(variant)
    }

    /// Add (or merge) a line into the cart.
    ///
    /// The line price is re-snapshotted to the current catalog price on every
    /// add, and the order total moves by the newly added amount only.
    pub async fn add_to_cart(
        &self,
        store: &dyn CartStore,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: i64,
    ) -> AppResult<CartView> {
        validate_quantity(quantity)?;

        let product = self.resolve_product(product_id).await?;
        let variant = match variant_id {
            Some(vid) => Some(self.resolve_variant(&product, vid).await?),
            None => None,
        };

        let product_ref = product.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
        let variant_ref = variant
            .as_ref()
            .and_then(|v| v.id.as_ref())
            .map(|id| id.to_string());

        let existing = store
            .find_line_by_key(&product_ref, variant_ref.as_deref())
            .await?;

        // Stock gate: the cart line as a whole may not exceed what is left
        let in_cart = existing.as_ref().map(|l| l.quantity).unwrap_or(0);
        let available = available_stock(product.quantity, variant.as_ref().map(|v| v.stock));
        if in_cart + quantity > available {
            return Err(AppError::new(ErrorCode::InsufficientStock)
                .with_detail("available", available)
                .with_detail("requested", in_cart + quantity));
        }

        let price = unit_price(product.price, variant.as_ref().map(|v| v.price));

        match existing {
            Some(line) => store.merge_line(&line, quantity, price).await?,
            None => {
                store
                    .add_line(NewLine {
                        product_id: product_ref,
                        variant_id: variant_ref,
                        quantity,
                        price,
                        product: ProductSummary::from(&product),
                        variant: variant.as_ref().map(VariantSummary::from),
                    })
                    .await?
            }
        }

        store.view().await
    }

    /// Overwrite a line's quantity after re-checking current stock
    pub async fn update_quantity(
        &self,
        store: &dyn CartStore,
        line_id: &str,
        quantity: i64,
    ) -> AppResult<CartView> {
        validate_quantity(quantity)?;

        let line = store
            .find_line(line_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;

        let product = ProductRepository::new(self.db.clone())
            .find_by_id(&line.product_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

        let variant = match &line.variant_id {
            Some(vid) => VariantRepository::new(self.db.clone())
                .find_by_id(vid)
                .await?,
            None => None,
        };

        let available = available_stock(product.quantity, variant.as_ref().map(|v| v.stock));
        if quantity > available {
            return Err(AppError::new(ErrorCode::InsufficientStock)
                .with_detail("available", available)
                .with_detail("requested", quantity));
        }

        store.set_quantity(&line, quantity).await?;
        store.view().await
    }

    /// Remove a line from the cart
    pub async fn remove_line(&self, store: &dyn CartStore, line_id: &str) -> AppResult<CartView> {
        let line = store
            .find_line(line_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;

        store.remove_line(&line).await?;
        store.view().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_stock_prefers_variant() {
        assert_eq!(available_stock(10, Some(3)), 3);
        assert_eq!(available_stock(10, None), 10);
        assert_eq!(available_stock(0, Some(7)), 7);
    }

    #[test]
    fn test_unit_price_prefers_variant() {
        assert_eq!(unit_price(9.99, Some(12.5)), 12.5);
        assert_eq!(unit_price(9.99, None), 9.99);
    }
}
