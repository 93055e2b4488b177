//! Cart & Checkout API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/cart/add | POST | 加入购物车 (合并同键行) | 可选 |
//! | /api/cart | GET, DELETE | 查看 / 清空购物车 | 可选 |
//! | /api/cart/items/{item_id} | PUT, DELETE | 修改数量 / 移除行 | 可选 |
//! | /api/checkout | POST | 结算 | 可选 |
//!
//! 认证"可选"：有 Bearer 令牌时操作数据库购物车，否则操作
//! X-Session-Id 指定的会话购物车。

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/cart", cart_routes())
        .route("/api/checkout", post(handler::checkout))
}

fn cart_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::view).delete(handler::clear))
        .route("/add", post(handler::add))
        .route(
            "/items/{item_id}",
            put(handler::update_item).delete(handler::remove_item),
        )
}
