//! Shared helpers for the integration suites: in-memory database, seed data
//! and caller identities.
#![allow(dead_code)]

use reef_server::auth::{Caller, CurrentUser};
use reef_server::db::define_schema;
use reef_server::db::models::{Product, ProductCreate, VariantAttribute};
use reef_server::db::repository::variant::VariantSeed;
use reef_server::db::repository::{ProductRepository, VariantRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

pub async fn memory_db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.expect("memory engine");
    db.use_ns("reef").use_db("test").await.expect("namespace");
    define_schema(&db).await.expect("schema");
    db
}

pub fn user_caller(id: &str) -> Caller {
    Caller::User(CurrentUser {
        id: id.to_string(),
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
    })
}

pub fn guest_caller(session: &str) -> Caller {
    Caller::Guest {
        session: Some(session.to_string()),
    }
}

pub async fn seed_product(db: &Surreal<Db>, name: &str, price: f64, quantity: i64) -> Product {
    ProductRepository::new(db.clone())
        .create(ProductCreate {
            name: name.to_string(),
            description: None,
            price,
            price_old: None,
            quantity: Some(quantity),
            promotion: None,
            status: Some("active".to_string()),
            images: None,
        })
        .await
        .expect("seed product")
}

pub fn product_ref(product: &Product) -> String {
    product
        .id
        .as_ref()
        .map(|id| id.to_string())
        .expect("product id")
}

/// Seed one variant with a bare SKU (no attribute pairs)
pub async fn seed_variant(
    db: &Surreal<Db>,
    product: &Product,
    sku: &str,
    stock: i64,
    price: f64,
) -> String {
    let repo = VariantRepository::new(db.clone());
    repo.reconcile(
        &product_ref(product),
        &[],
        &[VariantSeed {
            sku: sku.to_string(),
            attributes: Vec::<VariantAttribute>::new(),
        }],
        &[],
        stock,
        price,
    )
    .await
    .expect("seed variant");

    let variants = repo
        .find_by_product(&product_ref(product))
        .await
        .expect("read variants");
    variants
        .into_iter()
        .find(|v| v.sku == sku)
        .and_then(|v| v.id.map(|id| id.to_string()))
        .expect("variant id")
}
