//! Attribute API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{Attribute, AttributeCreate, AttributeUpdate};
use crate::db::repository::AttributeRepository;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use shared::{AppError, AppResult, ErrorCode};

fn validate_values(values: &Option<Vec<crate::db::models::AttributeValue>>) -> AppResult<()> {
    if let Some(values) = values {
        for value in values {
            validate_required_text(&value.name, "values.name", MAX_NAME_LEN)?;
        }
    }
    Ok(())
}

/// GET /api/attributes - 获取所有属性
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Attribute>>> {
    let repo = AttributeRepository::new(state.db.clone());
    let attributes = repo.find_all().await?;
    Ok(Json(attributes))
}

/// GET /api/attributes/{id} - 获取单个属性
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Attribute>> {
    let repo = AttributeRepository::new(state.db.clone());
    let attribute = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AttributeNotFound))?;
    Ok(Json(attribute))
}

/// POST /api/attributes - 创建属性
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AttributeCreate>,
) -> AppResult<Json<Attribute>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_values(&payload.values)?;

    let repo = AttributeRepository::new(state.db.clone());
    let attribute = repo.create(payload).await?;
    Ok(Json(attribute))
}

/// PUT /api/attributes/{id} - 更新属性
///
/// 注意：变体以索引引用属性值，重排/删除值会改变既有变体的指向。
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AttributeUpdate>,
) -> AppResult<Json<Attribute>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_values(&payload.values)?;

    let repo = AttributeRepository::new(state.db.clone());
    repo.find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AttributeNotFound))?;

    let attribute = repo.update(&id, payload).await?;
    Ok(Json(attribute))
}

/// DELETE /api/attributes/{id} - 删除属性
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = AttributeRepository::new(state.db.clone());
    let deleted = repo.delete(&id).await?;
    if !deleted {
        return Err(AppError::new(ErrorCode::AttributeNotFound));
    }
    Ok(Json(true))
}
