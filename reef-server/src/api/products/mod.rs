//! Product API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/products | GET, POST | 列表 (带筛选) / 创建 |
//! | /api/products/{id} | GET, PUT, DELETE | 详情 / 更新 / 软删除 |
//! | /api/products/{id}/restore | POST | 恢复软删除 |
//! | /api/products/{id}/variants | GET, PUT, PATCH | 变体列表 / 组合生成 / 批量更新 |
//! | /api/products/{id}/variants/{variant_id} | DELETE | 删除单个变体 |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", product_routes())
}

fn product_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/restore", post(handler::restore))
        .route(
            "/{id}/variants",
            get(handler::list_variants)
                .put(handler::generate_variants)
                .patch(handler::batch_update_variants),
        )
        .route(
            "/{id}/variants/{variant_id}",
            delete(handler::delete_variant),
        )
}
