//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - 错误类型 re-export (from shared::error)
//! - 日志、输入校验等工具

pub mod logger;
pub mod validation;

// Re-export unified error types from shared
pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
