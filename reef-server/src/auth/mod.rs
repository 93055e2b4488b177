//! 认证模块
//!
//! - [`JwtService`] - JWT 令牌生成与验证
//! - [`CurrentUser`] - 已登录用户 (从 JWT Claims 解析)
//! - [`Caller`] - 请求身份 (登录用户或匿名会话)，由 extractor 解析
//! - [`password`] - Argon2 密码散列

pub mod extractor;
pub mod jwt;
pub mod password;

pub use extractor::Caller;
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
