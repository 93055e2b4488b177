//! Shared types for the Reef storefront server.
//!
//! Currently this crate carries the unified error system: error codes,
//! categories, the [`error::AppError`] type and the [`error::ApiResponse`]
//! envelope used by every API handler.

pub mod error;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
