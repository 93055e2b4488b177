//! In-process session store for anonymous carts
//!
//! An ordered list of lines per session id, held in a concurrent map. The
//! whole list is replaced per operation; lines carry denormalized
//! product/variant snapshots captured at add time.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::store::{ProductSummary, VariantSummary};

/// One anonymous cart line (session persistence format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLine {
    /// Stable generated line id, so update/remove can address a line even
    /// when several variants of one product are in the cart
    pub line_id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub quantity: i64,
    pub price: f64,
    pub product: ProductSummary,
    pub variant: Option<VariantSummary>,
}

/// Concurrent map of session id → cart lines
#[derive(Clone, Default)]
pub struct SessionStore {
    carts: Arc<DashMap<String, Vec<SessionLine>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            carts: Arc::new(DashMap::new()),
        }
    }

    /// Allocate a fresh session id
    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// The lines of a session (empty when the session is unknown)
    pub fn lines(&self, session_id: &str) -> Vec<SessionLine> {
        self.carts
            .get(session_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Replace a session's lines wholesale
    pub fn put(&self, session_id: &str, lines: Vec<SessionLine>) {
        self.carts.insert(session_id.to_string(), lines);
    }

    /// Drop a session's cart entirely
    pub fn remove(&self, session_id: &str) {
        self.carts.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, product: &str, qty: i64) -> SessionLine {
        SessionLine {
            line_id: id.to_string(),
            product_id: product.to_string(),
            variant_id: None,
            quantity: qty,
            price: 10.0,
            product: ProductSummary {
                id: product.to_string(),
                name: "P".into(),
                price: 10.0,
                price_old: None,
                quantity: 100,
                status: None,
                image: None,
            },
            variant: None,
        }
    }

    #[test]
    fn test_unknown_session_is_empty() {
        let store = SessionStore::new();
        assert!(store.lines("nope").is_empty());
    }

    #[test]
    fn test_put_and_read_back() {
        let store = SessionStore::new();
        let sid = SessionStore::new_session_id();

        store.put(&sid, vec![line("l1", "product:a", 2)]);
        let lines = store.lines(&sid);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
    }

    #[test]
    fn test_remove_drops_cart() {
        let store = SessionStore::new();
        let sid = SessionStore::new_session_id();

        store.put(&sid, vec![line("l1", "product:a", 1)]);
        store.remove(&sid);
        assert!(store.lines(&sid).is_empty());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        store.put("a", vec![line("l1", "product:a", 1)]);
        store.put("b", vec![line("l2", "product:b", 5)]);

        assert_eq!(store.lines("a").len(), 1);
        assert_eq!(store.lines("b")[0].product_id, "product:b");
    }
}
