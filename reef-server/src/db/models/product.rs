//! Product Model
//!
//! Images are embedded in the product record; variants live in their own
//! table with the attribute-value pairs embedded per variant.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type ProductId = RecordId;

/// Product image (embedded in Product)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    pub image_url: String,
    #[serde(default)]
    pub is_thumbnail: bool,
}

/// Product model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ProductId>,
    pub name: String,
    pub description: Option<String>,
    /// Current unit price
    pub price: f64,
    /// Previous price, shown struck through
    pub price_old: Option<f64>,
    /// Stock for products sold without a variant
    #[serde(default)]
    pub quantity: i64,
    /// Detail page view counter
    #[serde(default)]
    pub view: i64,
    pub promotion: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// Soft-delete timestamp (unix millis); NONE = live
    pub deleted_at: Option<i64>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub price_old: Option<f64>,
    pub quantity: Option<i64>,
    pub promotion: Option<String>,
    pub status: Option<String>,
    pub images: Option<Vec<ProductImage>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub price_old: Option<f64>,
    pub quantity: Option<i64>,
    pub promotion: Option<String>,
    pub status: Option<String>,
    pub images: Option<Vec<ProductImage>>,
}

// =============================================================================
// Product Variant
// =============================================================================

/// Attribute-value pair embedded in a variant
///
/// Values are referenced by their index into the attribute's embedded value
/// list; the value name is snapshotted for SKU derivation and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantAttribute {
    #[serde(with = "serde_helpers::record_id")]
    pub attribute_id: RecordId,
    pub attribute_name: String,
    pub value_idx: i64,
    pub value_name: String,
}

/// Purchasable configuration of a product, identified by a derived SKU
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: ProductId,
    pub sku: String,
    pub stock: i64,
    pub price: f64,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub attributes: Vec<VariantAttribute>,
    /// Soft-delete timestamp (unix millis); NONE = live
    pub deleted_at: Option<i64>,
}
