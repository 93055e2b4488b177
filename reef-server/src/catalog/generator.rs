//! Variant generation orchestration
//!
//! Loads the selected attributes, expands the combinations, derives SKUs and
//! reconciles the product's variant set in one transaction.

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::combinations::{Selection, expand_combinations, plan_reconcile, sku_for};
use crate::db::models::VariantAttribute;
use crate::db::repository::{
    AttributeRepository, ProductRepository, VariantRepository, variant::VariantSeed,
};
use shared::{AppError, AppResult, ErrorCode};

/// One attribute axis of the request: which values of the attribute to cross
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeSelection {
    pub attribute_id: String,
    /// Indexes into the attribute's embedded value list
    pub value_idxs: Vec<i64>,
}

/// Request body for variant generation
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateVariantsRequest {
    pub attributes: Vec<AttributeSelection>,
    /// Stock applied to every produced variant
    pub stock: i64,
    /// Price applied to every produced variant
    pub price: f64,
}

/// Generate the variant set of a product from attribute selections.
///
/// Returns the SKUs of the generated set, in generation order.
pub async fn generate_variants(
    db: Surreal<Db>,
    product_id: &str,
    request: &GenerateVariantsRequest,
) -> AppResult<Vec<String>> {
    if request.attributes.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyVariantSelection));
    }
    if request.stock < 0 {
        return Err(AppError::validation("stock must not be negative").with_detail("field", "stock"));
    }
    if request.price < 0.0 {
        return Err(AppError::validation("price must not be negative").with_detail("field", "price"));
    }

    let product_repo = ProductRepository::new(db.clone());
    let attribute_repo = AttributeRepository::new(db.clone());
    let variant_repo = VariantRepository::new(db);

    let product = product_repo
        .find_active_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    let product_ref = product.id.as_ref().map(|id| id.to_string()).unwrap_or_default();

    // Resolve each axis: attribute + selected value names, in request order
    let mut axes: Vec<Vec<Selection>> = Vec::with_capacity(request.attributes.len());
    for selection in &request.attributes {
        let attribute = attribute_repo
            .find_by_id(&selection.attribute_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::AttributeNotFound)
                    .with_detail("attribute_id", selection.attribute_id.clone())
            })?;
        let attribute_ref = attribute
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default();

        let mut axis = Vec::with_capacity(selection.value_idxs.len());
        for &idx in &selection.value_idxs {
            let value = attribute
                .values
                .get(usize::try_from(idx).unwrap_or(usize::MAX))
                .ok_or_else(|| {
                    AppError::new(ErrorCode::AttributeValueNotFound)
                        .with_detail("attribute_id", attribute_ref.clone())
                        .with_detail("value_idx", idx)
                })?;
            axis.push(Selection {
                attribute_id: attribute_ref.clone(),
                attribute_name: attribute.name.clone(),
                value_idx: idx,
                value_name: value.name.clone(),
            });
        }
        axes.push(axis);
    }

    let combinations = expand_combinations(&axes);

    let existing: Vec<String> = variant_repo
        .find_by_product(&product_ref)
        .await?
        .into_iter()
        .map(|v| v.sku)
        .collect();

    let plan = plan_reconcile(&existing, &combinations);

    let mut seeds: Vec<VariantSeed> = Vec::with_capacity(plan.create.len());
    for (sku, combination) in &plan.create {
        let mut attributes = Vec::with_capacity(combination.len());
        for s in combination {
            attributes.push(VariantAttribute {
                attribute_id: s
                    .attribute_id
                    .parse()
                    .map_err(|_| AppError::internal("Malformed attribute id"))?,
                attribute_name: s.attribute_name.clone(),
                value_idx: s.value_idx,
                value_name: s.value_name.clone(),
            });
        }
        seeds.push(VariantSeed {
            sku: sku.clone(),
            attributes,
        });
    }

    tracing::info!(
        product = %product_ref,
        update = plan.update.len(),
        create = plan.create.len(),
        delete = plan.delete.len(),
        "Reconciling product variants"
    );

    variant_repo
        .reconcile(
            &product_ref,
            &plan.update,
            &seeds,
            &plan.delete,
            request.stock,
            request.price,
        )
        .await?;

    let mut skus: Vec<String> = Vec::with_capacity(combinations.len());
    for combination in &combinations {
        let sku = sku_for(combination);
        if !skus.contains(&sku) {
            skus.push(sku);
        }
    }
    Ok(skus)
}
