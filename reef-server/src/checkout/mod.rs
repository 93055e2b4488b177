//! 结算流程
//!
//! Validate shipping/payment/contact fields, recompute the total from the
//! cart lines, commit the order (with conditional stock decrements) in one
//! transaction, then hand off to the payment gateway for online payments.
//! The order is durably committed before any redirect URL is produced.

use std::sync::Arc;

use serde::Deserialize;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use validator::Validate;

use crate::auth::Caller;
use crate::cart::{CartLine, CartStore, SessionStore};
use crate::db::models::{Order, OrderStatus};
use crate::db::repository::order::{
    CheckoutFields, GuestContact, GuestLine, StockDecrement, StockField,
};
use crate::db::repository::OrderRepository;
use crate::money;
use crate::payment::PaymentGateway;
use shared::{AppError, AppResult, ErrorCode};

/// Checkout request body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 255))]
    pub shipping_method: String,
    /// "online" hands off to the payment gateway; anything else is
    /// cash-on-delivery
    #[validate(length(min = 1, max = 255))]
    pub payment: String,
    #[validate(length(min = 1, max = 255))]
    pub address_detail: String,
    #[validate(length(min = 1, max = 255))]
    pub ward: String,
    #[validate(length(min = 1, max = 255))]
    pub district: String,
    #[validate(length(min = 1, max = 255))]
    pub city: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub phone_number: String,
}

impl CheckoutRequest {
    pub fn is_online(&self) -> bool {
        self.payment == "online"
    }
}

/// What checkout produced
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Order placed (cash on delivery)
    Placed { order: Order },
    /// Order committed and awaiting online payment at `url`
    Redirect { order: Order, url: String },
}

/// Convert validator's per-field errors into a 422 with details
fn validation_failed(errors: validator::ValidationErrors) -> AppError {
    let mut err = AppError::new(ErrorCode::ValidationFailed);
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        err = err.with_detail(field.to_string(), serde_json::json!(messages));
    }
    err
}

/// Build the conditional stock decrements for a set of cart lines
fn stock_decrements(lines: &[CartLine]) -> AppResult<Vec<StockDecrement>> {
    let mut decrements = Vec::with_capacity(lines.len());
    for line in lines {
        let (target, field): (RecordId, StockField) = match &line.variant_id {
            Some(variant_ref) => (
                variant_ref
                    .parse()
                    .map_err(|_| AppError::internal("Malformed variant id in cart"))?,
                StockField::VariantStock,
            ),
            None => (
                line.product_id
                    .parse()
                    .map_err(|_| AppError::internal("Malformed product id in cart"))?,
                StockField::ProductQuantity,
            ),
        };
        decrements.push(StockDecrement {
            target,
            field,
            quantity: line.quantity,
        });
    }
    Ok(decrements)
}

pub struct CheckoutService {
    db: Surreal<Db>,
    sessions: SessionStore,
    payments: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    pub fn new(db: Surreal<Db>, sessions: SessionStore, payments: Arc<dyn PaymentGateway>) -> Self {
        Self {
            db,
            sessions,
            payments,
        }
    }

    pub async fn checkout(
        &self,
        caller: &Caller,
        store: &dyn CartStore,
        request: &CheckoutRequest,
    ) -> AppResult<CheckoutOutcome> {
        request.validate().map_err(validation_failed)?;

        let lines = store.lines().await?;
        if lines.is_empty() {
            return Err(AppError::new(ErrorCode::CartEmpty));
        }

        let total = money::cart_total(lines.iter().map(|l| (l.price, l.quantity)));
        let decrements = stock_decrements(&lines)?;

        let online = request.is_online();
        let status = if online {
            OrderStatus::AwaitingPayment
        } else {
            OrderStatus::Confirmed
        };

        let fields = CheckoutFields {
            shipping_method: request.shipping_method.clone(),
            payment: request.payment.clone(),
            address_detail: request.address_detail.clone(),
            ward: request.ward.clone(),
            district: request.district.clone(),
            city: request.city.clone(),
        };

        let order_repo = OrderRepository::new(self.db.clone());

        let order = match caller {
            Caller::User(user) => {
                let open = order_repo
                    .find_open_by_user(&user.id)
                    .await?
                    .ok_or_else(|| AppError::new(ErrorCode::CartEmpty))?;
                let order_id = open.id.as_ref().map(|id| id.to_string()).unwrap_or_default();

                order_repo
                    .checkout_user(&order_id, &fields, status, total, &decrements)
                    .await?
            }
            Caller::Guest { .. } => {
                let guest_lines: Vec<GuestLine> = lines
                    .iter()
                    .map(|l| GuestLine {
                        product_ref: l.product_id.clone(),
                        variant_ref: l.variant_id.clone(),
                        quantity: l.quantity,
                        price: l.price,
                    })
                    .collect();
                let contact = GuestContact {
                    name: request.name.clone(),
                    email: request.email.clone(),
                    phone_number: request.phone_number.clone(),
                };

                order_repo
                    .checkout_guest(&fields, status, total, &guest_lines, &contact, &decrements)
                    .await?
            }
        };

        if online {
            // Order and items are already durably committed; an abandoned
            // payment leaves an AwaitingPayment order, never orphan writes.
            // The session cart is kept until the payment confirms.
            let url = self.payments.create_payment_url(&order).await?;
            return Ok(CheckoutOutcome::Redirect { order, url });
        }

        // Cash on delivery: the anonymous session cart is spent
        if let Some(session_id) = caller.session_id() {
            self.sessions.remove(session_id);
        }

        Ok(CheckoutOutcome::Placed { order })
    }
}
