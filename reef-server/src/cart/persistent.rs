//! Authenticated cart: order-backed store
//!
//! Lines are `order_item` rows of the caller's open order. The open order is
//! created lazily on the first add; views render from live catalog rows, not
//! from add-time snapshots.

use async_trait::async_trait;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::store::{
    CartLine, CartLineView, CartStore, CartView, NewLine, ProductSummary, VariantSummary,
};
use crate::db::models::{Order, OrderItem};
use crate::db::repository::{OrderRepository, ProductRepository, VariantRepository};
use crate::money;
use shared::{AppError, AppResult, ErrorCode};

pub struct PersistentCartStore {
    order_repo: OrderRepository,
    product_repo: ProductRepository,
    variant_repo: VariantRepository,
    user_ref: String,
}

impl PersistentCartStore {
    pub fn new(db: Surreal<Db>, user_ref: String) -> Self {
        Self {
            order_repo: OrderRepository::new(db.clone()),
            product_repo: ProductRepository::new(db.clone()),
            variant_repo: VariantRepository::new(db),
            user_ref,
        }
    }

    async fn open_order(&self) -> AppResult<Option<Order>> {
        Ok(self.order_repo.find_open_by_user(&self.user_ref).await?)
    }

    /// The open order, or CartEmpty for mutation paths that need one
    async fn require_open_order(&self) -> AppResult<Order> {
        self.open_order()
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CartEmpty))
    }

    fn to_cart_line(item: &OrderItem) -> CartLine {
        CartLine {
            id: item.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            product_id: item.product_id.to_string(),
            variant_id: item.variant_id.as_ref().map(|v| v.to_string()),
            quantity: item.quantity,
            price: item.price,
        }
    }

    /// Live product/variant rows for rendering one line
    async fn render_line(&self, item: &OrderItem) -> AppResult<CartLineView> {
        let product = self
            .product_repo
            .find_by_id(&item.product_id.to_string())
            .await?
            .as_ref()
            .map(ProductSummary::from);

        let variant = match &item.variant_id {
            Some(vid) => self
                .variant_repo
                .find_by_id(&vid.to_string())
                .await?
                .as_ref()
                .map(VariantSummary::from),
            None => None,
        };

        Ok(CartLineView::new(
            &Self::to_cart_line(item),
            product,
            variant,
        ))
    }
}

#[async_trait]
impl CartStore for PersistentCartStore {
    async fn view(&self) -> AppResult<CartView> {
        let Some(order) = self.open_order().await? else {
            return Ok(CartView {
                order_id: None,
                session_id: None,
                total_amount: 0.0,
                items: vec![],
            });
        };

        let order_id = order.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
        let items = self.order_repo.items(&order_id).await?;

        let mut views = Vec::with_capacity(items.len());
        for item in &items {
            views.push(self.render_line(item).await?);
        }

        Ok(CartView {
            order_id: Some(order_id),
            session_id: None,
            total_amount: order.total_amount,
            items: views,
        })
    }

    async fn lines(&self) -> AppResult<Vec<CartLine>> {
        let Some(order) = self.open_order().await? else {
            return Ok(vec![]);
        };
        let order_id = order.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
        let items = self.order_repo.items(&order_id).await?;
        Ok(items.iter().map(Self::to_cart_line).collect())
    }

    async fn find_line(&self, line_id: &str) -> AppResult<Option<CartLine>> {
        let order = self.require_open_order().await?;
        let order_id = order.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
        let item = self.order_repo.find_item(&order_id, line_id).await?;
        Ok(item.as_ref().map(Self::to_cart_line))
    }

    async fn find_line_by_key(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> AppResult<Option<CartLine>> {
        let Some(order) = self.open_order().await? else {
            return Ok(None);
        };
        let order_id = order.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
        let item = self
            .order_repo
            .find_line_by_key(&order_id, product_id, variant_id)
            .await?;
        Ok(item.as_ref().map(Self::to_cart_line))
    }

    async fn add_line(&self, line: NewLine) -> AppResult<()> {
        let order = self.order_repo.find_or_create_open(&self.user_ref).await?;
        let order_id = order.id.as_ref().map(|id| id.to_string()).unwrap_or_default();

        let delta = money::line_total(line.price, line.quantity);
        self.order_repo
            .insert_line(
                &order_id,
                &line.product_id,
                line.variant_id,
                line.quantity,
                line.price,
                delta,
            )
            .await?;
        Ok(())
    }

    async fn merge_line(&self, line: &CartLine, add_qty: i64, new_price: f64) -> AppResult<()> {
        let order = self.require_open_order().await?;
        let order_id = order.id.as_ref().map(|id| id.to_string()).unwrap_or_default();

        // Total moves by the newly added amount only; the stored line price
        // is re-snapshotted to the current catalog price.
        let delta = money::line_total(new_price, add_qty);
        self.order_repo
            .merge_line(&order_id, &line.id, add_qty, new_price, delta)
            .await?;
        Ok(())
    }

    async fn set_quantity(&self, line: &CartLine, quantity: i64) -> AppResult<()> {
        let order = self.require_open_order().await?;
        let order_id = order.id.as_ref().map(|id| id.to_string()).unwrap_or_default();

        // Signed delta: new line total minus old line total
        let delta = money::to_f64(
            money::to_decimal(money::line_total(line.price, quantity))
                - money::to_decimal(money::line_total(line.price, line.quantity)),
        );
        self.order_repo
            .set_line_quantity(&order_id, &line.id, quantity, delta)
            .await?;
        Ok(())
    }

    async fn remove_line(&self, line: &CartLine) -> AppResult<()> {
        let order = self.require_open_order().await?;
        let order_id = order.id.as_ref().map(|id| id.to_string()).unwrap_or_default();

        let amount = money::line_total(line.price, line.quantity);
        self.order_repo
            .remove_line(&order_id, &line.id, amount)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        let order = self.require_open_order().await?;
        let order_id = order.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
        self.order_repo.clear(&order_id).await?;
        Ok(())
    }
}
