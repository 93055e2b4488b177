//! Reef Storefront Server - 电商店面后端
//!
//! # 架构概述
//!
//! 本模块是 Reef 服务器的主入口，提供以下核心功能：
//!
//! - **商品目录** (`api/products`, `api/attributes`): 商品、图片、变体与属性组合
//! - **购物车** (`cart`): 匿名会话购物车与登录用户数据库购物车的统一能力
//! - **结算** (`checkout`): 订单确认、游客订单、支付跳转
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **认证** (`auth`): JWT + Argon2 认证体系
//!
//! # 模块结构
//!
//! ```text
//! reef-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、身份解析
//! ├── api/           # HTTP 路由和处理器
//! ├── cart/          # 购物车存储 (会话 / 数据库)
//! ├── catalog/       # 变体组合生成
//! ├── checkout/      # 结算流程
//! ├── payment/       # 外部支付跳转
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod core;
pub mod db;
pub mod money;
pub mod payment;
pub mod utils;

// Re-export 公共类型
pub use auth::{Caller, CurrentUser, JwtService};
pub use cart::{CartService, CartStore};
pub use core::{Config, Server, ServerState};

// Re-export unified error types from shared
pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    // .env 可选，不存在时静默忽略
    let _ = dotenv::dotenv();

    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        log_dir.as_deref(),
    );

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____            ____
   / __ \___  ___  / __/
  / /_/ / _ \/ _ \/ /_
 / _, _/  __/  __/ __/
/_/ |_|\___/\___/_/
    "#
    );
}
