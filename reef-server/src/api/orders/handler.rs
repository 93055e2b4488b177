//! Order API Handlers
//!
//! All endpoints are scoped to the authenticated caller.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderItem, OrderStatus};
use crate::db::repository::{OrderRepository, ProductRepository, VariantRepository};
use crate::money;
use shared::{AppError, AppResult, ErrorCode};

/// One rendered order line
#[derive(Debug, Serialize)]
pub struct OrderItemView {
    pub id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub product_name: Option<String>,
    pub sku: Option<String>,
    pub quantity: i64,
    pub price: f64,
    pub total_price: f64,
}

/// A rendered order
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: String,
    pub status_id: OrderStatus,
    pub status: &'static str,
    pub total_amount: f64,
    pub payment: Option<String>,
    pub shipping_method: Option<String>,
    pub address_detail: Option<String>,
    pub ward: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub items: Vec<OrderItemView>,
}

async fn render_items(state: &ServerState, items: &[OrderItem]) -> AppResult<Vec<OrderItemView>> {
    let product_repo = ProductRepository::new(state.db.clone());
    let variant_repo = VariantRepository::new(state.db.clone());

    let mut views = Vec::with_capacity(items.len());
    for item in items {
        let product_name = product_repo
            .find_by_id(&item.product_id.to_string())
            .await?
            .map(|p| p.name);

        let sku = match &item.variant_id {
            Some(vid) => variant_repo
                .find_by_id(&vid.to_string())
                .await?
                .map(|v| v.sku),
            None => None,
        };

        views.push(OrderItemView {
            id: item.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            product_id: item.product_id.to_string(),
            variant_id: item.variant_id.as_ref().map(|v| v.to_string()),
            product_name,
            sku,
            quantity: item.quantity,
            price: item.price,
            total_price: money::line_total(item.price, item.quantity),
        });
    }
    Ok(views)
}

async fn render_order(state: &ServerState, order: &Order) -> AppResult<OrderView> {
    let order_id = order.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
    let items = OrderRepository::new(state.db.clone()).items(&order_id).await?;

    Ok(OrderView {
        id: order_id,
        status_id: order.status_id,
        status: order.status_id.label(),
        total_amount: order.total_amount,
        payment: order.payment.clone(),
        shipping_method: order.shipping_method.clone(),
        address_detail: order.address_detail.clone(),
        ward: order.ward.clone(),
        district: order.district.clone(),
        city: order.city.clone(),
        created_at: order.created_at,
        updated_at: order.updated_at,
        items: render_items(state, &items).await?,
    })
}

/// GET /api/orders - 当前用户的历史订单 (不含 Open 购物车)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<OrderView>>> {
    let repo = OrderRepository::new(state.db.clone());
    let orders = repo.list_past_by_user(&user.id).await?;

    let mut views = Vec::with_capacity(orders.len());
    for order in &orders {
        views.push(render_order(&state, order).await?);
    }
    Ok(Json(views))
}

/// GET /api/orders/{id} - 订单详情 (仅限本人)
pub async fn detail(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    let repo = OrderRepository::new(state.db.clone());
    let order = repo
        .find_for_user(&id, &user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    Ok(Json(render_order(&state, &order).await?))
}

/// POST /api/orders/{id}/cancel - 取消订单
///
/// 仅允许 Confirmed → Cancelled；其余状态一律拒绝且不产生任何变更。
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    let repo = OrderRepository::new(state.db.clone());
    let order = repo
        .find_for_user(&id, &user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    if !order.status_id.can_transition_to(OrderStatus::Cancelled) {
        return Err(AppError::new(ErrorCode::OrderNotCancellable)
            .with_detail("status", order.status_id.code()));
    }

    // Conditional write: a concurrent transition loses here without mutation
    let transitioned = repo
        .transition(&id, order.status_id, OrderStatus::Cancelled)
        .await?;
    if !transitioned {
        return Err(AppError::new(ErrorCode::OrderNotCancellable)
            .with_detail("status", order.status_id.code()));
    }

    let cancelled = repo
        .find_for_user(&id, &user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(Json(render_order(&state, &cancelled).await?))
}
