//! Attribute Model
//!
//! Values are embedded directly in the attribute record and referenced by
//! index from variant attribute pairs.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type AttributeId = RecordId;

/// Attribute value (embedded in Attribute)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValue {
    pub name: String,
    #[serde(default)]
    pub display_order: i32,
}

impl AttributeValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_order: 0,
        }
    }
}

/// Attribute model (with embedded values)
///
/// 例: name = "Color", values = [Red, Blue]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<AttributeId>,
    pub name: String,
    #[serde(default)]
    pub values: Vec<AttributeValue>,
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeCreate {
    pub name: String,
    pub values: Option<Vec<AttributeValue>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeUpdate {
    pub name: Option<String>,
    pub values: Option<Vec<AttributeValue>>,
    pub is_active: Option<bool>,
}
