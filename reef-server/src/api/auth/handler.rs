//! Auth API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, verify_password};
use crate::core::ServerState;
use crate::db::models::UserView;
use crate::db::repository::UserRepository;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_required_text,
};
use shared::{AppError, AppResult};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

/// POST /api/auth/register - 注册新用户
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    if !payload.email.contains('@') {
        return Err(AppError::validation("email is not a valid address")
            .with_detail("field", "email"));
    }
    if payload.password.len() < MIN_PASSWORD_LEN || payload.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        ))
        .with_detail("field", "password"));
    }

    let repo = UserRepository::new(state.db.clone());
    let password_hash = hash_password(&payload.password)?;
    let user = repo
        .create(payload.name, payload.email, password_hash)
        .await?;

    let user_id = user.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
    let token = state
        .jwt_service
        .generate_token(&user_id, &user.name, &user.email)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(target: "security", user = %user_id, "user_registered");

    Ok(Json(AuthResponse {
        token,
        user: UserView::from(&user),
    }))
}

/// POST /api/auth/login - 登录
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let repo = UserRepository::new(state.db.clone());

    let user = repo
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&payload.password, &user.password_hash) {
        tracing::warn!(target: "security", email = %payload.email, "login_failed");
        return Err(AppError::invalid_credentials());
    }

    let user_id = user.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
    let token = state
        .jwt_service
        .generate_token(&user_id, &user.name, &user.email)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    Ok(Json(AuthResponse {
        token,
        user: UserView::from(&user),
    }))
}
