//! Order API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/orders | GET | 订单列表 (status != Open) | 必须 |
//! | /api/orders/{id} | GET | 订单详情 (仅限本人) | 必须 |
//! | /api/orders/{id}/cancel | POST | 取消订单 (仅 Confirmed) | 必须 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::detail))
        .route("/{id}/cancel", post(handler::cancel))
}
