//! Order Model
//!
//! An order doubles as the authenticated cart: the row with
//! `status_id = Open` is the caller's in-progress cart, mutated by every
//! cart operation, and checkout moves it through the status machine.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use std::fmt;
use surrealdb::RecordId;

pub type OrderId = RecordId;

/// Order status, numeric on the wire
///
/// | Code | Status | Meaning |
/// |------|--------|---------|
/// | 1 | Open | 购物车 (未确认) |
/// | 2 | Confirmed | 已确认 (货到付款或支付完成) |
/// | 3 | AwaitingPayment | 等待在线支付回调 |
/// | 5 | Cancelled | 已取消 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum OrderStatus {
    Open = 1,
    Confirmed = 2,
    AwaitingPayment = 3,
    Cancelled = 5,
}

impl OrderStatus {
    #[inline]
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    /// Human-readable status label
    pub const fn label(&self) -> &'static str {
        match self {
            OrderStatus::Open => "Open",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::AwaitingPayment => "Awaiting payment",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// The full transition table, encoded once.
    ///
    /// - Open → Confirmed (COD checkout)
    /// - Open → AwaitingPayment (online checkout)
    /// - AwaitingPayment → Confirmed (external payment confirmation)
    /// - Confirmed → Cancelled (the only path into Cancelled)
    pub const fn can_transition_to(&self, target: OrderStatus) -> bool {
        matches!(
            (self, target),
            (OrderStatus::Open, OrderStatus::Confirmed)
                | (OrderStatus::Open, OrderStatus::AwaitingPayment)
                | (OrderStatus::AwaitingPayment, OrderStatus::Confirmed)
                | (OrderStatus::Confirmed, OrderStatus::Cancelled)
        )
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }
}

impl From<OrderStatus> for u8 {
    #[inline]
    fn from(status: OrderStatus) -> Self {
        status.code()
    }
}

/// Error when converting from an invalid u8 to OrderStatus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidOrderStatus(pub u8);

impl fmt::Display for InvalidOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid order status: {}", self.0)
    }
}

impl std::error::Error for InvalidOrderStatus {}

impl TryFrom<u8> for OrderStatus {
    type Error = InvalidOrderStatus;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(OrderStatus::Open),
            2 => Ok(OrderStatus::Confirmed),
            3 => Ok(OrderStatus::AwaitingPayment),
            5 => Ok(OrderStatus::Cancelled),
            other => Err(InvalidOrderStatus(other)),
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    /// NONE for guest orders
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub user_id: Option<RecordId>,
    pub status_id: OrderStatus,
    pub total_amount: f64,
    pub shipping_method: Option<String>,
    pub payment: Option<String>,
    pub address_detail: Option<String>,
    pub ward: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line item
///
/// `price` is a snapshot captured at add-time, not re-derived later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order_id: OrderId,
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub variant_id: Option<RecordId>,
    pub quantity: i64,
    pub price: f64,
}

/// Contact/shipping details for a checkout performed without authentication,
/// linked 1:1 to an Order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestOrder {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order_id: OrderId,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: String,
    pub address_detail: String,
    pub ward: String,
    pub district: String,
    pub city: String,
}
