//! Cart & Checkout API Handlers

use axum::{Json, extract::{Path, State}};
use serde::{Deserialize, Serialize};

use crate::auth::Caller;
use crate::cart::{CartService, CartView};
use crate::checkout::{CheckoutOutcome, CheckoutRequest, CheckoutService};
use crate::core::ServerState;
use crate::db::models::Order;
use shared::AppResult;

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CheckoutResponse {
    /// Online payment: the client must follow the redirect URL
    Redirect { url: String },
    /// Cash on delivery: order placed
    Placed { message: String, order: Order },
}

fn cart_service(state: &ServerState) -> CartService {
    CartService::new(state.db.clone(), state.sessions.clone())
}

/// POST /api/cart/add - 加入购物车
pub async fn add(
    State(state): State<ServerState>,
    caller: Caller,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<CartView>> {
    let service = cart_service(&state);
    let store = service.store_for(&caller);
    let view = service
        .add_to_cart(
            store.as_ref(),
            &payload.product_id,
            payload.variant_id.as_deref(),
            payload.quantity,
        )
        .await?;
    Ok(Json(view))
}

/// GET /api/cart - 查看购物车 (空购物车返回空视图)
pub async fn view(State(state): State<ServerState>, caller: Caller) -> AppResult<Json<CartView>> {
    let service = cart_service(&state);
    let store = service.store_for(&caller);
    let view = store.view().await?;
    Ok(Json(view))
}

/// PUT /api/cart/items/{item_id} - 修改行数量
pub async fn update_item(
    State(state): State<ServerState>,
    caller: Caller,
    Path(item_id): Path<String>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<CartView>> {
    let service = cart_service(&state);
    let store = service.store_for(&caller);
    let view = service
        .update_quantity(store.as_ref(), &item_id, payload.quantity)
        .await?;
    Ok(Json(view))
}

/// DELETE /api/cart/items/{item_id} - 移除行
pub async fn remove_item(
    State(state): State<ServerState>,
    caller: Caller,
    Path(item_id): Path<String>,
) -> AppResult<Json<CartView>> {
    let service = cart_service(&state);
    let store = service.store_for(&caller);
    let view = service.remove_line(store.as_ref(), &item_id).await?;
    Ok(Json(view))
}

/// DELETE /api/cart - 清空购物车
pub async fn clear(State(state): State<ServerState>, caller: Caller) -> AppResult<Json<CartView>> {
    let service = cart_service(&state);
    let store = service.store_for(&caller);
    store.clear().await?;
    store.view().await.map(Json)
}

/// POST /api/checkout - 结算
pub async fn checkout(
    State(state): State<ServerState>,
    caller: Caller,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<CheckoutResponse>> {
    let cart = cart_service(&state);
    let store = cart.store_for(&caller);

    let service = CheckoutService::new(
        state.db.clone(),
        state.sessions.clone(),
        state.payments.clone(),
    );

    let outcome = service.checkout(&caller, store.as_ref(), &payload).await?;
    let response = match outcome {
        CheckoutOutcome::Redirect { url, .. } => CheckoutResponse::Redirect { url },
        CheckoutOutcome::Placed { order } => CheckoutResponse::Placed {
            message: "Order has been placed successfully".to_string(),
            order,
        },
    };
    Ok(Json(response))
}
