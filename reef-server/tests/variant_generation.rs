//! Variant combination generation against the in-memory engine: expansion,
//! SKU derivation, idempotent reconciliation and deletions.

mod common;

use common::*;
use reef_server::ErrorCode;
use reef_server::catalog::{AttributeSelection, GenerateVariantsRequest, generate_variants};
use reef_server::db::models::{Attribute, AttributeCreate, AttributeValue};
use reef_server::db::repository::{AttributeRepository, VariantRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

async fn seed_attribute(db: &Surreal<Db>, name: &str, values: &[&str]) -> Attribute {
    AttributeRepository::new(db.clone())
        .create(AttributeCreate {
            name: name.to_string(),
            values: Some(values.iter().map(|v| AttributeValue::new(*v)).collect()),
        })
        .await
        .expect("seed attribute")
}

fn attribute_ref(attribute: &Attribute) -> String {
    attribute
        .id
        .as_ref()
        .map(|id| id.to_string())
        .expect("attribute id")
}

fn selection(attribute: &Attribute, idxs: &[i64]) -> AttributeSelection {
    AttributeSelection {
        attribute_id: attribute_ref(attribute),
        value_idxs: idxs.to_vec(),
    }
}

#[tokio::test]
async fn color_size_grid_produces_four_variants() {
    let db = memory_db().await;
    let product = seed_product(&db, "Shirt", 20.0, 0).await;
    let color = seed_attribute(&db, "Color", &["Red", "Blue"]).await;
    let size = seed_attribute(&db, "Size", &["S", "M"]).await;

    let skus = generate_variants(
        db.clone(),
        &product_ref(&product),
        &GenerateVariantsRequest {
            attributes: vec![selection(&color, &[0, 1]), selection(&size, &[0, 1])],
            stock: 7,
            price: 21.5,
        },
    )
    .await
    .unwrap();

    assert_eq!(
        skus,
        vec!["SKU-Red-S", "SKU-Red-M", "SKU-Blue-S", "SKU-Blue-M"]
    );

    let variants = VariantRepository::new(db.clone())
        .find_by_product(&product_ref(&product))
        .await
        .unwrap();
    assert_eq!(variants.len(), 4);
    for variant in &variants {
        assert_eq!(variant.stock, 7);
        assert_eq!(variant.price, 21.5);
        assert_eq!(variant.attributes.len(), 2);
    }

    // attribute pairs record the selection that produced the variant
    let red_s = variants.iter().find(|v| v.sku == "SKU-Red-S").unwrap();
    assert_eq!(red_s.attributes[0].attribute_name, "Color");
    assert_eq!(red_s.attributes[0].value_name, "Red");
    assert_eq!(red_s.attributes[1].attribute_name, "Size");
    assert_eq!(red_s.attributes[1].value_name, "S");
}

#[tokio::test]
async fn rerunning_identical_input_is_idempotent() {
    let db = memory_db().await;
    let product = seed_product(&db, "Shirt", 20.0, 0).await;
    let color = seed_attribute(&db, "Color", &["Red", "Blue"]).await;
    let size = seed_attribute(&db, "Size", &["S", "M"]).await;

    let request = GenerateVariantsRequest {
        attributes: vec![selection(&color, &[0, 1]), selection(&size, &[0, 1])],
        stock: 7,
        price: 21.5,
    };

    generate_variants(db.clone(), &product_ref(&product), &request)
        .await
        .unwrap();

    let variants_repo = VariantRepository::new(db.clone());
    let first = variants_repo
        .find_by_product(&product_ref(&product))
        .await
        .unwrap();

    // second run with new stock/price updates in place, no dupes, no deletes
    let request = GenerateVariantsRequest {
        stock: 3,
        price: 19.0,
        ..request
    };
    generate_variants(db.clone(), &product_ref(&product), &request)
        .await
        .unwrap();

    let second = variants_repo
        .find_by_product(&product_ref(&product))
        .await
        .unwrap();
    assert_eq!(second.len(), 4);

    let mut first_ids: Vec<String> = first
        .iter()
        .map(|v| v.id.as_ref().unwrap().to_string())
        .collect();
    let mut second_ids: Vec<String> = second
        .iter()
        .map(|v| v.id.as_ref().unwrap().to_string())
        .collect();
    first_ids.sort();
    second_ids.sort();
    assert_eq!(first_ids, second_ids, "records survive a re-run");

    for variant in &second {
        assert_eq!(variant.stock, 3);
        assert_eq!(variant.price, 19.0);
    }
}

#[tokio::test]
async fn dropping_a_value_deletes_exactly_its_variants() {
    let db = memory_db().await;
    let product = seed_product(&db, "Shirt", 20.0, 0).await;
    let color = seed_attribute(&db, "Color", &["Red", "Blue"]).await;
    let size = seed_attribute(&db, "Size", &["S", "M"]).await;

    generate_variants(
        db.clone(),
        &product_ref(&product),
        &GenerateVariantsRequest {
            attributes: vec![selection(&color, &[0, 1]), selection(&size, &[0, 1])],
            stock: 7,
            price: 21.5,
        },
    )
    .await
    .unwrap();

    // Blue removed from the request
    generate_variants(
        db.clone(),
        &product_ref(&product),
        &GenerateVariantsRequest {
            attributes: vec![selection(&color, &[0]), selection(&size, &[0, 1])],
            stock: 7,
            price: 21.5,
        },
    )
    .await
    .unwrap();

    let mut skus: Vec<String> = VariantRepository::new(db.clone())
        .find_by_product(&product_ref(&product))
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.sku)
        .collect();
    skus.sort();
    assert_eq!(skus, vec!["SKU-Red-M", "SKU-Red-S"]);
}

#[tokio::test]
async fn axis_without_values_deletes_all_variants() {
    let db = memory_db().await;
    let product = seed_product(&db, "Shirt", 20.0, 0).await;
    let color = seed_attribute(&db, "Color", &["Red", "Blue"]).await;

    generate_variants(
        db.clone(),
        &product_ref(&product),
        &GenerateVariantsRequest {
            attributes: vec![selection(&color, &[0, 1])],
            stock: 7,
            price: 21.5,
        },
    )
    .await
    .unwrap();

    // an axis with zero selected values collapses the Cartesian product
    let skus = generate_variants(
        db.clone(),
        &product_ref(&product),
        &GenerateVariantsRequest {
            attributes: vec![selection(&color, &[])],
            stock: 7,
            price: 21.5,
        },
    )
    .await
    .unwrap();
    assert!(skus.is_empty());

    let variants = VariantRepository::new(db.clone())
        .find_by_product(&product_ref(&product))
        .await
        .unwrap();
    assert!(variants.is_empty());
}

#[tokio::test]
async fn invalid_selections_are_rejected() {
    let db = memory_db().await;
    let product = seed_product(&db, "Shirt", 20.0, 0).await;
    let color = seed_attribute(&db, "Color", &["Red", "Blue"]).await;

    // no axes at all
    let err = generate_variants(
        db.clone(),
        &product_ref(&product),
        &GenerateVariantsRequest {
            attributes: vec![],
            stock: 1,
            price: 1.0,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::EmptyVariantSelection);

    // unknown attribute
    let err = generate_variants(
        db.clone(),
        &product_ref(&product),
        &GenerateVariantsRequest {
            attributes: vec![AttributeSelection {
                attribute_id: "attribute:doesnotexist".to_string(),
                value_idxs: vec![0],
            }],
            stock: 1,
            price: 1.0,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::AttributeNotFound);

    // value index out of range
    let err = generate_variants(
        db.clone(),
        &product_ref(&product),
        &GenerateVariantsRequest {
            attributes: vec![selection(&color, &[5])],
            stock: 1,
            price: 1.0,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::AttributeValueNotFound);

    // unknown product
    let err = generate_variants(
        db.clone(),
        "product:doesnotexist",
        &GenerateVariantsRequest {
            attributes: vec![selection(&color, &[0])],
            stock: 1,
            price: 1.0,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductNotFound);
}
