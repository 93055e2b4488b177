//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;

use crate::catalog::{self, GenerateVariantsRequest};
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate, ProductVariant};
use crate::db::repository::product::ProductQuery;
use crate::db::repository::variant::VariantPatch;
use crate::db::repository::{ProductRepository, VariantRepository};
use crate::utils::validation::{MAX_NAME_LEN, MAX_TEXT_LEN, validate_optional_text, validate_required_text};
use shared::{AppError, AppResult, ErrorCode};

/// Product detail: the product plus its live variants
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
}

fn validate_product_fields(
    name: Option<&String>,
    description: &Option<String>,
    price: Option<f64>,
    quantity: Option<i64>,
) -> AppResult<()> {
    if let Some(name) = name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(description, "description", MAX_TEXT_LEN)?;
    if let Some(price) = price
        && (!price.is_finite() || price < 0.0)
    {
        return Err(AppError::validation("price must be a non-negative number")
            .with_detail("field", "price"));
    }
    if let Some(quantity) = quantity
        && quantity < 0
    {
        return Err(AppError::validation("quantity must not be negative")
            .with_detail("field", "quantity"));
    }
    Ok(())
}

/// GET /api/products - 获取商品列表 (带筛选)
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<ProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_all(&filter).await?;
    Ok(Json(products))
}

/// GET /api/products/{id} - 获取商品详情 (访问计数 +1)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductDetail>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_active_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    repo.increment_view(&id).await?;

    let product_ref = product.id.as_ref().map(|p| p.to_string()).unwrap_or_default();
    let variants = VariantRepository::new(state.db.clone())
        .find_by_product(&product_ref)
        .await?;

    Ok(Json(ProductDetail { product, variants }))
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    validate_product_fields(
        Some(&payload.name),
        &payload.description,
        Some(payload.price),
        payload.quantity,
    )?;

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(payload).await?;

    Ok(Json(product))
}

/// PUT /api/products/{id} - 更新商品
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    validate_product_fields(
        payload.name.as_ref(),
        &payload.description,
        payload.price,
        payload.quantity,
    )?;

    let repo = ProductRepository::new(state.db.clone());

    // 404 before attempting the dynamic update
    repo.find_active_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    let product = repo.update(&id, payload).await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} - 软删除商品 (级联变体)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = ProductRepository::new(state.db.clone());
    repo.find_active_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    repo.soft_delete(&id).await?;
    Ok(Json(true))
}

/// POST /api/products/{id}/restore - 恢复软删除的商品
pub async fn restore(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    repo.restore(&id).await?;

    let restored = repo
        .find_by_id(&id)
        .await?
        .unwrap_or(product);
    Ok(Json(restored))
}

// =============================================================================
// Variant Handlers
// =============================================================================

/// Response for variant generation
#[derive(Debug, Serialize)]
pub struct GeneratedVariantsResponse {
    pub skus: Vec<String>,
}

/// Response for batch update operation
#[derive(Debug, Serialize)]
pub struct BatchUpdateResponse {
    pub updated: usize,
}

/// GET /api/products/{id}/variants - 变体列表
pub async fn list_variants(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<ProductVariant>>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_active_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    let product_ref = product.id.as_ref().map(|p| p.to_string()).unwrap_or_default();
    let variants = VariantRepository::new(state.db.clone())
        .find_by_product(&product_ref)
        .await?;
    Ok(Json(variants))
}

/// PUT /api/products/{id}/variants - 从属性选择生成/对账变体集合
pub async fn generate_variants(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<GenerateVariantsRequest>,
) -> AppResult<Json<GeneratedVariantsResponse>> {
    let skus = catalog::generate_variants(state.db.clone(), &id, &payload).await?;
    Ok(Json(GeneratedVariantsResponse { skus }))
}

/// PATCH /api/products/{id}/variants - 批量更新变体库存/价格/缩略图
pub async fn batch_update_variants(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(patches): Json<Vec<VariantPatch>>,
) -> AppResult<Json<BatchUpdateResponse>> {
    let repo = ProductRepository::new(state.db.clone());
    repo.find_active_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    let updated = VariantRepository::new(state.db.clone())
        .apply_patches(&patches)
        .await?;

    tracing::info!(product = %id, updated, total = patches.len(), "Batch variant update");

    Ok(Json(BatchUpdateResponse { updated }))
}

/// DELETE /api/products/{id}/variants/{variant_id} - 删除单个变体
pub async fn delete_variant(
    State(state): State<ServerState>,
    Path((id, variant_id)): Path<(String, String)>,
) -> AppResult<Json<bool>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_active_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    let product_ref = product.id.as_ref().map(|p| p.to_string()).unwrap_or_default();
    VariantRepository::new(state.db.clone())
        .soft_delete(&product_ref, &variant_id)
        .await
        .map_err(|e| match e {
            crate::db::repository::RepoError::NotFound(_) => {
                AppError::new(ErrorCode::VariantNotFound)
            }
            other => other.into(),
        })?;

    Ok(Json(true))
}
