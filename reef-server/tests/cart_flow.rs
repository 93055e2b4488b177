//! Cart and checkout flows against the in-memory engine: both store
//! implementations, stock gating, total bookkeeping, checkout commits and
//! the order status machine.

mod common;

use std::sync::Arc;

use common::*;
use reef_server::cart::{CartService, SessionStore};
use reef_server::checkout::{CheckoutOutcome, CheckoutRequest, CheckoutService};
use reef_server::db::models::OrderStatus;
use reef_server::db::repository::{OrderRepository, ProductRepository};
use reef_server::payment::RedirectGateway;
use reef_server::ErrorCode;

fn checkout_request(payment: &str) -> CheckoutRequest {
    CheckoutRequest {
        shipping_method: "standard".to_string(),
        payment: payment.to_string(),
        address_detail: "12 Harbour Road".to_string(),
        ward: "Ward 4".to_string(),
        district: "District 1".to_string(),
        city: "Da Nang".to_string(),
        name: "Linh Tran".to_string(),
        email: Some("linh@example.com".to_string()),
        phone_number: "0905123456".to_string(),
    }
}

fn services(
    db: &surrealdb::Surreal<surrealdb::engine::local::Db>,
) -> (CartService, CheckoutService, SessionStore) {
    let sessions = SessionStore::new();
    let cart = CartService::new(db.clone(), sessions.clone());
    let checkout = CheckoutService::new(
        db.clone(),
        sessions.clone(),
        Arc::new(RedirectGateway::new("https://pay.example/cashier".into())),
    );
    (cart, checkout, sessions)
}

// ============================================================================
// Add to cart
// ============================================================================

#[tokio::test]
async fn add_to_empty_cart_creates_single_line() {
    let db = memory_db().await;
    let (cart, _, _) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);

    let view = cart
        .add_to_cart(store.as_ref(), &product_ref(&product), None, 3)
        .await
        .unwrap();

    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].quantity, 3);
    assert_eq!(view.items[0].price, 25.0);
    assert_eq!(view.total_amount, 75.0);
    assert!(view.order_id.is_some());

    // the open cart order now exists
    let open = OrderRepository::new(db.clone())
        .find_open_by_user("user:alice")
        .await
        .unwrap();
    assert!(open.is_some());
    assert_eq!(open.unwrap().status_id, OrderStatus::Open);
}

#[tokio::test]
async fn adding_same_product_twice_merges_lines() {
    let db = memory_db().await;
    let (cart, _, _) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);

    cart.add_to_cart(store.as_ref(), &product_ref(&product), None, 2)
        .await
        .unwrap();
    let view = cart
        .add_to_cart(store.as_ref(), &product_ref(&product), None, 3)
        .await
        .unwrap();

    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].quantity, 5);
    assert_eq!(view.total_amount, 125.0);
}

#[tokio::test]
async fn guest_cart_merges_by_product_and_variant() {
    let db = memory_db().await;
    let (cart, _, _) = services(&db);
    let product = seed_product(&db, "Shirt", 15.0, 20).await;

    let caller = guest_caller("session-1");
    let store = cart.store_for(&caller);

    cart.add_to_cart(store.as_ref(), &product_ref(&product), None, 1)
        .await
        .unwrap();
    let view = cart
        .add_to_cart(store.as_ref(), &product_ref(&product), None, 4)
        .await
        .unwrap();

    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].quantity, 5);
    assert_eq!(view.total_amount, 75.0);
    assert_eq!(view.session_id.as_deref(), Some("session-1"));

    // snapshot captured at add time
    let product_snapshot = view.items[0].product.as_ref().unwrap();
    assert_eq!(product_snapshot.name, "Shirt");
}

#[tokio::test]
async fn over_stock_add_is_rejected_without_mutation() {
    let db = memory_db().await;
    let (cart, _, _) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);

    let err = cart
        .add_to_cart(store.as_ref(), &product_ref(&product), None, 11)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    // nothing was created
    assert!(store.view().await.unwrap().items.is_empty());
    let open = OrderRepository::new(db.clone())
        .find_open_by_user("user:alice")
        .await
        .unwrap();
    assert!(open.is_none());
}

#[tokio::test]
async fn cumulative_quantity_is_gated_by_stock() {
    let db = memory_db().await;
    let (cart, _, _) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);

    cart.add_to_cart(store.as_ref(), &product_ref(&product), None, 7)
        .await
        .unwrap();
    let err = cart
        .add_to_cart(store.as_ref(), &product_ref(&product), None, 4)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    // the first add is untouched
    let view = store.view().await.unwrap();
    assert_eq!(view.items[0].quantity, 7);
    assert_eq!(view.total_amount, 175.0);
}

#[tokio::test]
async fn variant_line_uses_variant_price_and_stock() {
    let db = memory_db().await;
    let (cart, _, _) = services(&db);
    // product itself is out of stock; only the variant can be bought
    let product = seed_product(&db, "Hoodie", 40.0, 0).await;
    let variant_id = seed_variant(&db, &product, "SKU-Black-L", 5, 47.5).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);

    let view = cart
        .add_to_cart(store.as_ref(), &product_ref(&product), Some(&variant_id), 2)
        .await
        .unwrap();

    assert_eq!(view.items[0].price, 47.5);
    assert_eq!(view.total_amount, 95.0);

    // variant stock is the gate
    let err = cart
        .add_to_cart(store.as_ref(), &product_ref(&product), Some(&variant_id), 4)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);
}

#[tokio::test]
async fn variant_of_another_product_is_rejected() {
    let db = memory_db().await;
    let (cart, _, _) = services(&db);
    let product_a = seed_product(&db, "Hoodie", 40.0, 10).await;
    let product_b = seed_product(&db, "Cap", 12.0, 10).await;
    let variant_of_a = seed_variant(&db, &product_a, "SKU-Black-L", 5, 47.5).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);

    let err = cart
        .add_to_cart(store.as_ref(), &product_ref(&product_b), Some(&variant_of_a), 1)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::VariantMismatch);
}

#[tokio::test]
async fn unknown_product_and_variant_are_not_found() {
    let db = memory_db().await;
    let (cart, _, _) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);

    let err = cart
        .add_to_cart(store.as_ref(), "product:doesnotexist", None, 1)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductNotFound);

    let err = cart
        .add_to_cart(
            store.as_ref(),
            &product_ref(&product),
            Some("product_variant:doesnotexist"),
            1,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::VariantNotFound);
}

// ============================================================================
// Cart mutation
// ============================================================================

#[tokio::test]
async fn update_quantity_moves_total_by_signed_delta() {
    let db = memory_db().await;
    let (cart, _, _) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);

    let view = cart
        .add_to_cart(store.as_ref(), &product_ref(&product), None, 2)
        .await
        .unwrap();
    let line_id = view.items[0].id.clone();

    // grow
    let view = cart
        .update_quantity(store.as_ref(), &line_id, 5)
        .await
        .unwrap();
    assert_eq!(view.items[0].quantity, 5);
    assert_eq!(view.total_amount, 125.0);

    // shrink
    let view = cart
        .update_quantity(store.as_ref(), &line_id, 1)
        .await
        .unwrap();
    assert_eq!(view.items[0].quantity, 1);
    assert_eq!(view.total_amount, 25.0);
}

#[tokio::test]
async fn update_quantity_validates_input_and_stock() {
    let db = memory_db().await;
    let (cart, _, _) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);
    let view = cart
        .add_to_cart(store.as_ref(), &product_ref(&product), None, 2)
        .await
        .unwrap();
    let line_id = view.items[0].id.clone();

    let err = cart
        .update_quantity(store.as_ref(), &line_id, 0)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);

    let err = cart
        .update_quantity(store.as_ref(), &line_id, 11)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    // rejections never mutate
    let view = store.view().await.unwrap();
    assert_eq!(view.items[0].quantity, 2);
    assert_eq!(view.total_amount, 50.0);
}

#[tokio::test]
async fn unknown_line_is_cart_item_not_found() {
    let db = memory_db().await;
    let (cart, _, _) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);
    cart.add_to_cart(store.as_ref(), &product_ref(&product), None, 1)
        .await
        .unwrap();

    let err = cart
        .update_quantity(store.as_ref(), "order_item:missing", 2)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CartItemNotFound);
}

#[tokio::test]
async fn remove_line_decreases_total_exactly() {
    let db = memory_db().await;
    let (cart, _, _) = services(&db);
    let mug = seed_product(&db, "Mug", 25.0, 10).await;
    let cap = seed_product(&db, "Cap", 12.0, 10).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);

    cart.add_to_cart(store.as_ref(), &product_ref(&mug), None, 3)
        .await
        .unwrap();
    let view = cart
        .add_to_cart(store.as_ref(), &product_ref(&cap), None, 2)
        .await
        .unwrap();
    assert_eq!(view.total_amount, 99.0);

    let cap_line = view
        .items
        .iter()
        .find(|l| l.product_id == product_ref(&cap))
        .unwrap()
        .id
        .clone();

    // removing Cap (12 × 2) leaves exactly the Mug total
    let view = cart.remove_line(store.as_ref(), &cap_line).await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.total_amount, 75.0);
}

#[tokio::test]
async fn clear_cart_always_yields_empty_cart_and_zero_total() {
    let db = memory_db().await;
    let (cart, _, _) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    // authenticated
    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);
    cart.add_to_cart(store.as_ref(), &product_ref(&product), None, 4)
        .await
        .unwrap();
    store.clear().await.unwrap();
    let view = store.view().await.unwrap();
    assert!(view.items.is_empty());
    assert_eq!(view.total_amount, 0.0);

    // anonymous: the whole session list is discarded
    let guest = guest_caller("session-9");
    let guest_store = cart.store_for(&guest);
    cart.add_to_cart(guest_store.as_ref(), &product_ref(&product), None, 2)
        .await
        .unwrap();
    guest_store.clear().await.unwrap();
    let view = guest_store.view().await.unwrap();
    assert!(view.items.is_empty());
    assert_eq!(view.total_amount, 0.0);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn checkout_with_empty_cart_creates_no_order() {
    let db = memory_db().await;
    let (cart, checkout, _) = services(&db);

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);

    let err = checkout
        .checkout(&caller, store.as_ref(), &checkout_request("cod"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CartEmpty);

    let guest = guest_caller("session-empty");
    let guest_store = cart.store_for(&guest);
    let err = checkout
        .checkout(&guest, guest_store.as_ref(), &checkout_request("cod"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CartEmpty);
}

#[tokio::test]
async fn checkout_rejects_invalid_fields() {
    let db = memory_db().await;
    let (cart, checkout, _) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = guest_caller("session-2");
    let store = cart.store_for(&caller);
    cart.add_to_cart(store.as_ref(), &product_ref(&product), None, 1)
        .await
        .unwrap();

    let mut request = checkout_request("cod");
    request.city = String::new();
    request.email = Some("not-an-email".to_string());

    let err = checkout
        .checkout(&caller, store.as_ref(), &request)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);
    let details = err.details.unwrap();
    assert!(details.contains_key("city"));
    assert!(details.contains_key("email"));
}

#[tokio::test]
async fn user_cod_checkout_confirms_order_and_decrements_stock() {
    let db = memory_db().await;
    let (cart, checkout, _) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);
    cart.add_to_cart(store.as_ref(), &product_ref(&product), None, 3)
        .await
        .unwrap();

    let outcome = checkout
        .checkout(&caller, store.as_ref(), &checkout_request("cod"))
        .await
        .unwrap();

    let order = match outcome {
        CheckoutOutcome::Placed { order } => order,
        other => panic!("expected Placed, got {:?}", other),
    };
    assert_eq!(order.status_id, OrderStatus::Confirmed);
    assert_eq!(order.total_amount, 75.0);
    assert_eq!(order.payment.as_deref(), Some("cod"));
    assert_eq!(order.city.as_deref(), Some("Da Nang"));

    // stock decremented atomically inside the checkout transaction
    let product = ProductRepository::new(db.clone())
        .find_by_id(&product_ref(&product))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.quantity, 7);

    // the open cart is gone
    let open = OrderRepository::new(db.clone())
        .find_open_by_user("user:alice")
        .await
        .unwrap();
    assert!(open.is_none());
}

#[tokio::test]
async fn guest_cod_checkout_persists_lines_and_guest_contact() {
    let db = memory_db().await;
    let (cart, checkout, sessions) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = guest_caller("session-3");
    let store = cart.store_for(&caller);
    cart.add_to_cart(store.as_ref(), &product_ref(&product), None, 2)
        .await
        .unwrap();

    let outcome = checkout
        .checkout(&caller, store.as_ref(), &checkout_request("cod"))
        .await
        .unwrap();
    let order = match outcome {
        CheckoutOutcome::Placed { order } => order,
        other => panic!("expected Placed, got {:?}", other),
    };

    assert!(order.user_id.is_none());
    assert_eq!(order.status_id, OrderStatus::Confirmed);
    assert_eq!(order.total_amount, 50.0);

    let repo = OrderRepository::new(db.clone());
    let order_id = order.id.as_ref().unwrap().to_string();

    let items = repo.items(&order_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].price, 25.0);

    let guest = repo.guest_order_for(&order_id).await.unwrap().unwrap();
    assert_eq!(guest.name, "Linh Tran");
    assert_eq!(guest.phone_number, "0905123456");
    assert_eq!(guest.city, "Da Nang");

    // COD checkout spends the session cart
    assert!(sessions.lines("session-3").is_empty());
}

#[tokio::test]
async fn online_checkout_redirects_and_keeps_session_cart() {
    let db = memory_db().await;
    let (cart, checkout, sessions) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = guest_caller("session-4");
    let store = cart.store_for(&caller);
    cart.add_to_cart(store.as_ref(), &product_ref(&product), None, 1)
        .await
        .unwrap();

    let outcome = checkout
        .checkout(&caller, store.as_ref(), &checkout_request("online"))
        .await
        .unwrap();

    let (order, url) = match outcome {
        CheckoutOutcome::Redirect { order, url } => (order, url),
        other => panic!("expected Redirect, got {:?}", other),
    };
    assert_eq!(order.status_id, OrderStatus::AwaitingPayment);
    assert!(url.starts_with("https://pay.example/cashier?order="));
    assert!(url.contains("amount=25.00"));

    // order was durably committed before the redirect
    let persisted = OrderRepository::new(db.clone())
        .find_by_id(&order.id.as_ref().unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(persisted.status_id, OrderStatus::AwaitingPayment);

    // the session cart is kept until the payment confirms
    assert!(!sessions.lines("session-4").is_empty());
}

#[tokio::test]
async fn checkout_shortfall_aborts_atomically() {
    let db = memory_db().await;
    let (cart, checkout, _) = services(&db);
    let mug = seed_product(&db, "Mug", 25.0, 10).await;
    let cap = seed_product(&db, "Cap", 12.0, 10).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);
    cart.add_to_cart(store.as_ref(), &product_ref(&mug), None, 3)
        .await
        .unwrap();
    cart.add_to_cart(store.as_ref(), &product_ref(&cap), None, 2)
        .await
        .unwrap();

    // a concurrent sale drains the Cap stock below the cart quantity
    let products = ProductRepository::new(db.clone());
    products
        .update(
            &product_ref(&cap),
            reef_server::db::models::ProductUpdate {
                name: None,
                description: None,
                price: None,
                price_old: None,
                quantity: Some(1),
                promotion: None,
                status: None,
                images: None,
            },
        )
        .await
        .unwrap();

    let err = checkout
        .checkout(&caller, store.as_ref(), &checkout_request("cod"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    // neither stock moved, and the cart order is still open
    let mug_after = products.find_by_id(&product_ref(&mug)).await.unwrap().unwrap();
    let cap_after = products.find_by_id(&product_ref(&cap)).await.unwrap().unwrap();
    assert_eq!(mug_after.quantity, 10);
    assert_eq!(cap_after.quantity, 1);

    let open = OrderRepository::new(db.clone())
        .find_open_by_user("user:alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(open.status_id, OrderStatus::Open);
}

// ============================================================================
// Order status machine
// ============================================================================

#[tokio::test]
async fn cancel_succeeds_only_from_confirmed() {
    let db = memory_db().await;
    let (cart, checkout, _) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = user_caller("user:alice");
    let store = cart.store_for(&caller);
    cart.add_to_cart(store.as_ref(), &product_ref(&product), None, 1)
        .await
        .unwrap();

    let repo = OrderRepository::new(db.clone());
    let open_id = repo
        .find_open_by_user("user:alice")
        .await
        .unwrap()
        .unwrap()
        .id
        .unwrap()
        .to_string();

    // conditional transition from Confirmed fails while the order is Open
    assert!(!repo
        .transition(&open_id, OrderStatus::Confirmed, OrderStatus::Cancelled)
        .await
        .unwrap());
    assert_eq!(
        repo.find_by_id(&open_id).await.unwrap().unwrap().status_id,
        OrderStatus::Open
    );

    // confirm via checkout, then cancel
    checkout
        .checkout(&caller, store.as_ref(), &checkout_request("cod"))
        .await
        .unwrap();
    assert!(repo
        .transition(&open_id, OrderStatus::Confirmed, OrderStatus::Cancelled)
        .await
        .unwrap());
    assert_eq!(
        repo.find_by_id(&open_id).await.unwrap().unwrap().status_id,
        OrderStatus::Cancelled
    );

    // cancelled is terminal: the conditional write does not fire twice
    assert!(!repo
        .transition(&open_id, OrderStatus::Confirmed, OrderStatus::Cancelled)
        .await
        .unwrap());
}

#[tokio::test]
async fn order_history_excludes_the_open_cart() {
    let db = memory_db().await;
    let (cart, checkout, _) = services(&db);
    let product = seed_product(&db, "Mug", 25.0, 10).await;

    let caller = user_caller("user:alice");

    // one confirmed order
    let store = cart.store_for(&caller);
    cart.add_to_cart(store.as_ref(), &product_ref(&product), None, 1)
        .await
        .unwrap();
    checkout
        .checkout(&caller, store.as_ref(), &checkout_request("cod"))
        .await
        .unwrap();

    // and a fresh open cart
    cart.add_to_cart(store.as_ref(), &product_ref(&product), None, 2)
        .await
        .unwrap();

    let repo = OrderRepository::new(db.clone());
    let past = repo.list_past_by_user("user:alice").await.unwrap();
    assert_eq!(past.len(), 1);
    assert_eq!(past[0].status_id, OrderStatus::Confirmed);
}
