//! Database Models

pub mod attribute;
pub mod order;
pub mod product;
pub mod serde_helpers;
pub mod user;

pub use attribute::{Attribute, AttributeCreate, AttributeUpdate, AttributeValue};
pub use order::{GuestOrder, Order, OrderItem, OrderStatus};
pub use product::{
    Product, ProductCreate, ProductImage, ProductUpdate, ProductVariant, VariantAttribute,
};
pub use user::{User, UserView};
