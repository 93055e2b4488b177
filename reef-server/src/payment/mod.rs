//! 在线支付跳转 (外部协作方)
//!
//! The payment provider is an external collaborator: given a committed
//! order it returns a redirect URL, or fails with a provider error. The
//! provider client itself is out of scope; [`RedirectGateway`] builds the
//! hand-off URL for an external cashier from configuration.

use async_trait::async_trait;

use crate::db::models::Order;
use shared::{AppError, AppResult, ErrorCode};

/// External payment-URL generator
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Produce the redirect URL for an order awaiting online payment.
    ///
    /// Called only after the order has been durably committed.
    async fn create_payment_url(&self, order: &Order) -> AppResult<String>;
}

/// Configuration-based gateway: hands the order off to an external cashier
/// endpoint via query parameters.
pub struct RedirectGateway {
    base_url: String,
}

impl RedirectGateway {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }
}

#[async_trait]
impl PaymentGateway for RedirectGateway {
    async fn create_payment_url(&self, order: &Order) -> AppResult<String> {
        let order_id = order
            .id
            .as_ref()
            .map(|id| id.to_string())
            .ok_or_else(|| AppError::new(ErrorCode::PaymentFailed))?;

        Ok(format!(
            "{}?order={}&amount={:.2}",
            self.base_url, order_id, order.total_amount
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::OrderStatus;

    fn order(total: f64) -> Order {
        Order {
            id: Some("order:abc".parse().unwrap()),
            user_id: None,
            status_id: OrderStatus::AwaitingPayment,
            total_amount: total,
            shipping_method: None,
            payment: Some("online".into()),
            address_detail: None,
            ward: None,
            district: None,
            city: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[tokio::test]
    async fn test_redirect_url_contains_order_and_amount() {
        let gateway = RedirectGateway::new("https://pay.example/checkout".into());
        let url = gateway.create_payment_url(&order(123.4)).await.unwrap();
        assert_eq!(url, "https://pay.example/checkout?order=order:abc&amount=123.40");
    }

    #[tokio::test]
    async fn test_order_without_id_is_a_payment_error() {
        let gateway = RedirectGateway::new("https://pay.example/checkout".into());
        let mut o = order(10.0);
        o.id = None;
        assert!(gateway.create_payment_url(&o).await.is_err());
    }
}
