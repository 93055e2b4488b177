//! Anonymous cart: session-backed store
//!
//! Lines render from the snapshots captured at add time; they are not
//! refreshed against the catalog afterwards (the authenticated store renders
//! live rows instead).

use async_trait::async_trait;
use uuid::Uuid;

use super::session::{SessionLine, SessionStore};
use super::store::{CartLine, CartLineView, CartStore, CartView, NewLine};
use crate::money;
use shared::AppResult;

pub struct EphemeralCartStore {
    sessions: SessionStore,
    session_id: String,
}

impl EphemeralCartStore {
    pub fn new(sessions: SessionStore, session_id: String) -> Self {
        Self {
            sessions,
            session_id,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn to_cart_line(line: &SessionLine) -> CartLine {
        CartLine {
            id: line.line_id.clone(),
            product_id: line.product_id.clone(),
            variant_id: line.variant_id.clone(),
            quantity: line.quantity,
            price: line.price,
        }
    }
}

#[async_trait]
impl CartStore for EphemeralCartStore {
    async fn view(&self) -> AppResult<CartView> {
        let lines = self.sessions.lines(&self.session_id);

        let items: Vec<CartLineView> = lines
            .iter()
            .map(|l| {
                CartLineView::new(
                    &Self::to_cart_line(l),
                    Some(l.product.clone()),
                    l.variant.clone(),
                )
            })
            .collect();

        let total_amount = money::cart_total(lines.iter().map(|l| (l.price, l.quantity)));

        Ok(CartView {
            order_id: None,
            session_id: Some(self.session_id.clone()),
            total_amount,
            items,
        })
    }

    async fn lines(&self) -> AppResult<Vec<CartLine>> {
        Ok(self
            .sessions
            .lines(&self.session_id)
            .iter()
            .map(Self::to_cart_line)
            .collect())
    }

    async fn find_line(&self, line_id: &str) -> AppResult<Option<CartLine>> {
        Ok(self
            .sessions
            .lines(&self.session_id)
            .iter()
            .find(|l| l.line_id == line_id)
            .map(Self::to_cart_line))
    }

    async fn find_line_by_key(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> AppResult<Option<CartLine>> {
        Ok(self
            .sessions
            .lines(&self.session_id)
            .iter()
            .find(|l| l.product_id == product_id && l.variant_id.as_deref() == variant_id)
            .map(Self::to_cart_line))
    }

    async fn add_line(&self, line: NewLine) -> AppResult<()> {
        let mut lines = self.sessions.lines(&self.session_id);
        lines.push(SessionLine {
            line_id: Uuid::new_v4().to_string(),
            product_id: line.product_id,
            variant_id: line.variant_id,
            quantity: line.quantity,
            price: line.price,
            product: line.product,
            variant: line.variant,
        });
        self.sessions.put(&self.session_id, lines);
        Ok(())
    }

    async fn merge_line(&self, line: &CartLine, add_qty: i64, new_price: f64) -> AppResult<()> {
        let mut lines = self.sessions.lines(&self.session_id);
        if let Some(existing) = lines.iter_mut().find(|l| l.line_id == line.id) {
            existing.quantity += add_qty;
            existing.price = new_price;
        }
        self.sessions.put(&self.session_id, lines);
        Ok(())
    }

    async fn set_quantity(&self, line: &CartLine, quantity: i64) -> AppResult<()> {
        let mut lines = self.sessions.lines(&self.session_id);
        if let Some(existing) = lines.iter_mut().find(|l| l.line_id == line.id) {
            existing.quantity = quantity;
        }
        self.sessions.put(&self.session_id, lines);
        Ok(())
    }

    async fn remove_line(&self, line: &CartLine) -> AppResult<()> {
        let mut lines = self.sessions.lines(&self.session_id);
        lines.retain(|l| l.line_id != line.id);
        self.sessions.put(&self.session_id, lines);
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.sessions.remove(&self.session_id);
        Ok(())
    }
}
