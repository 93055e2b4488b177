//! Attribute API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/attributes | GET, POST | 列表 / 创建 |
//! | /api/attributes/{id} | GET, PUT, DELETE | 详情 / 更新 / 删除 |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/attributes", attribute_routes())
}

fn attribute_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
