//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册 / 登录
//! - [`products`] - 商品管理接口 (含变体)
//! - [`attributes`] - 属性管理接口
//! - [`cart`] - 购物车与结算接口
//! - [`orders`] - 订单查询与取消接口

pub mod attributes;
pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;

// Re-export common types for handlers
pub use shared::{ApiResponse, AppResult};
