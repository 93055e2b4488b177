//! The CartStore capability
//!
//! One interface over the two cart homes: the session list (anonymous) and
//! the open order's line items (authenticated). Handlers and the checkout
//! flow only ever talk to `dyn CartStore`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::money;
use shared::AppResult;

/// Denormalized product snapshot carried by session cart lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub price_old: Option<f64>,
    pub quantity: i64,
    pub status: Option<String>,
    /// First image URL, if any
    pub image: Option<String>,
}

/// Denormalized variant snapshot carried by session cart lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantSummary {
    pub id: String,
    pub sku: String,
    pub stock: i64,
    pub price: f64,
    pub thumbnail: Option<String>,
}

impl From<&crate::db::models::Product> for ProductSummary {
    fn from(p: &crate::db::models::Product) -> Self {
        Self {
            id: p.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            name: p.name.clone(),
            price: p.price,
            price_old: p.price_old,
            quantity: p.quantity,
            status: p.status.clone(),
            image: p.images.first().map(|i| i.image_url.clone()),
        }
    }
}

impl From<&crate::db::models::ProductVariant> for VariantSummary {
    fn from(v: &crate::db::models::ProductVariant) -> Self {
        Self {
            id: v.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            sku: v.sku.clone(),
            stock: v.stock,
            price: v.price,
            thumbnail: v.thumbnail.clone(),
        }
    }
}

/// A cart line as the store keeps it (no rendering data)
#[derive(Debug, Clone)]
pub struct CartLine {
    /// order_item record id, or the session line id
    pub id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub quantity: i64,
    pub price: f64,
}

/// A fully resolved line about to be appended to a cart.
///
/// The snapshots are captured by the service at add time; the ephemeral
/// store keeps them, the persistent store renders from live rows instead.
#[derive(Debug, Clone)]
pub struct NewLine {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub quantity: i64,
    pub price: f64,
    pub product: ProductSummary,
    pub variant: Option<VariantSummary>,
}

/// One rendered cart line
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub quantity: i64,
    pub price: f64,
    pub total_price: f64,
    pub product: Option<ProductSummary>,
    pub variant: Option<VariantSummary>,
}

impl CartLineView {
    pub fn new(line: &CartLine, product: Option<ProductSummary>, variant: Option<VariantSummary>) -> Self {
        Self {
            id: line.id.clone(),
            product_id: line.product_id.clone(),
            variant_id: line.variant_id.clone(),
            quantity: line.quantity,
            price: line.price,
            total_price: money::line_total(line.price, line.quantity),
            product,
            variant,
        }
    }
}

/// The rendered cart
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    /// Open order id (authenticated carts only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Session id (anonymous carts only; clients echo it in X-Session-Id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub total_amount: f64,
    pub items: Vec<CartLineView>,
}

impl CartView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Storage capability shared by the anonymous and authenticated carts.
///
/// Stock checks and price resolution live in [`super::CartService`]; the
/// store only moves validated data.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Render the cart. An absent cart renders as an empty cart.
    async fn view(&self) -> AppResult<CartView>;

    /// All lines, for checkout
    async fn lines(&self) -> AppResult<Vec<CartLine>>;

    /// Locate a line by its id
    async fn find_line(&self, line_id: &str) -> AppResult<Option<CartLine>>;

    /// Locate a line by its (product, variant) merge key
    async fn find_line_by_key(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> AppResult<Option<CartLine>>;

    /// Append a new line
    async fn add_line(&self, line: NewLine) -> AppResult<()>;

    /// Merge into an existing line: quantity += add_qty, price re-snapshotted
    async fn merge_line(&self, line: &CartLine, add_qty: i64, new_price: f64) -> AppResult<()>;

    /// Overwrite a line's quantity
    async fn set_quantity(&self, line: &CartLine, quantity: i64) -> AppResult<()>;

    /// Remove a line
    async fn remove_line(&self, line: &CartLine) -> AppResult<()>;

    /// Drop every line
    async fn clear(&self) -> AppResult<()>;
}
