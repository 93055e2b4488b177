//! Order Repository
//!
//! The order row with `status_id = Open` is the authenticated caller's cart.
//! Every mutation that touches more than one row (line upsert + total,
//! checkout + stock decrements) is a single transaction script; stock
//! decrements are conditional updates that THROW on shortfall, cancelling
//! the whole transaction.

use super::{BaseRepository, RepoError, RepoResult, collect_errors, now_millis, record_key, record_ref};
use crate::db::models::{GuestOrder, Order, OrderItem, OrderStatus};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use uuid::Uuid;

const ORDER_TABLE: &str = "order";
const ITEM_TABLE: &str = "order_item";

/// Shipping/payment fields captured at checkout
#[derive(Debug, Clone)]
pub struct CheckoutFields {
    pub shipping_method: String,
    pub payment: String,
    pub address_detail: String,
    pub ward: String,
    pub district: String,
    pub city: String,
}

/// Guest contact details (1:1 guest_order record)
#[derive(Debug, Clone)]
pub struct GuestContact {
    pub name: String,
    pub email: Option<String>,
    pub phone_number: String,
}

/// Which stock column a checkout line decrements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockField {
    /// `product.quantity` (line without a variant)
    ProductQuantity,
    /// `product_variant.stock`
    VariantStock,
}

impl StockField {
    const fn column(&self) -> &'static str {
        match self {
            StockField::ProductQuantity => "quantity",
            StockField::VariantStock => "stock",
        }
    }
}

/// One conditional stock decrement inside a checkout transaction
#[derive(Debug, Clone)]
pub struct StockDecrement {
    pub target: RecordId,
    pub field: StockField,
    pub quantity: i64,
}

/// A line to persist during guest checkout
#[derive(Debug, Clone)]
pub struct GuestLine {
    pub product_ref: String,
    pub variant_ref: Option<String>,
    pub quantity: i64,
    pub price: f64,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn order_thing(&self, order_id: &str) -> RecordId {
        RecordId::from_table_key(ORDER_TABLE, record_key(ORDER_TABLE, order_id))
    }

    fn item_thing(&self, item_id: &str) -> RecordId {
        RecordId::from_table_key(ITEM_TABLE, record_key(ITEM_TABLE, item_id))
    }

    // =========================================================================
    // Order queries
    // =========================================================================

    pub async fn find_by_id(&self, order_id: &str) -> RepoResult<Option<Order>> {
        let pure_id = record_key(ORDER_TABLE, order_id);
        let order: Option<Order> = self.base.db().select((ORDER_TABLE, pure_id)).await?;
        Ok(order)
    }

    /// The caller's open cart order, if any
    pub async fn find_open_by_user(&self, user_ref: &str) -> RepoResult<Option<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM order WHERE user_id = $user AND status_id = $open LIMIT 1",
            )
            .bind(("user", record_ref("user", user_ref)))
            .bind(("open", OrderStatus::Open))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Find-or-create the caller's open cart order.
    ///
    /// 每个用户最多一个 Open 订单：先查再建。
    pub async fn find_or_create_open(&self, user_ref: &str) -> RepoResult<Order> {
        if let Some(order) = self.find_open_by_user(user_ref).await? {
            return Ok(order);
        }

        let now = now_millis();
        let order = Order {
            id: None,
            user_id: Some(
                record_ref("user", user_ref)
                    .parse()
                    .map_err(|_| RepoError::Validation(format!("Invalid user id {user_ref}")))?,
            ),
            status_id: OrderStatus::Open,
            total_amount: 0.0,
            shipping_method: None,
            payment: None,
            address_detail: None,
            ward: None,
            district: None,
            city: None,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Past orders of a user (everything that is not the open cart), newest first
    pub async fn list_past_by_user(&self, user_ref: &str) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM order WHERE user_id = $user AND status_id != $open \
                 ORDER BY created_at DESC",
            )
            .bind(("user", record_ref("user", user_ref)))
            .bind(("open", OrderStatus::Open))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// An order scoped to its owner; None when absent or owned by someone else
    pub async fn find_for_user(&self, order_id: &str, user_ref: &str) -> RepoResult<Option<Order>> {
        let user_ref = record_ref("user", user_ref);
        Ok(self.find_by_id(order_id).await?.filter(|o| {
            o.user_id
                .as_ref()
                .is_some_and(|u| u.to_string() == user_ref)
        }))
    }

    /// Conditional status transition; false when the order was not in `from`
    /// (covers both lost races and invalid transitions, without mutation).
    pub async fn transition(
        &self,
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> RepoResult<bool> {
        let hit: Vec<Order> = self
            .base
            .db()
            .query(
                "UPDATE $ord SET status_id = $to, updated_at = $now \
                 WHERE status_id = $from RETURN AFTER",
            )
            .bind(("ord", self.order_thing(order_id)))
            .bind(("from", from))
            .bind(("to", to))
            .bind(("now", now_millis()))
            .await?
            .take(0)?;
        Ok(!hit.is_empty())
    }

    // =========================================================================
    // Line items
    // =========================================================================

    pub async fn items(&self, order_id: &str) -> RepoResult<Vec<OrderItem>> {
        let items: Vec<OrderItem> = self
            .base
            .db()
            .query("SELECT * FROM order_item WHERE order_id = $ord")
            .bind(("ord", record_ref(ORDER_TABLE, order_id)))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// A line item scoped to its order
    pub async fn find_item(&self, order_id: &str, item_id: &str) -> RepoResult<Option<OrderItem>> {
        let pure_id = record_key(ITEM_TABLE, item_id);
        let item: Option<OrderItem> = self.base.db().select((ITEM_TABLE, pure_id)).await?;

        let order_ref = record_ref(ORDER_TABLE, order_id);
        Ok(item.filter(|i| i.order_id.to_string() == order_ref))
    }

    /// The line of an order matching (product, variant), if any
    pub async fn find_line_by_key(
        &self,
        order_id: &str,
        product_ref: &str,
        variant_ref: Option<&str>,
    ) -> RepoResult<Option<OrderItem>> {
        let items: Vec<OrderItem> = self
            .base
            .db()
            .query("SELECT * FROM order_item WHERE order_id = $ord AND product_id = $product")
            .bind(("ord", record_ref(ORDER_TABLE, order_id)))
            .bind(("product", product_ref.to_string()))
            .await?
            .take(0)?;

        Ok(items.into_iter().find(|i| {
            i.variant_id.as_ref().map(|v| v.to_string()).as_deref() == variant_ref
        }))
    }

    /// Merge into an existing line: quantity += qty, price re-snapshotted to
    /// the current catalog price, order total moved by `delta`.
    pub async fn merge_line(
        &self,
        order_id: &str,
        item_id: &str,
        add_qty: i64,
        new_price: f64,
        delta: f64,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "
                BEGIN TRANSACTION;
                UPDATE $item SET quantity += $qty, price = $price;
                UPDATE $ord SET total_amount += $delta, updated_at = $now;
                COMMIT TRANSACTION;
                ",
            )
            .bind(("item", self.item_thing(item_id)))
            .bind(("ord", self.order_thing(order_id)))
            .bind(("qty", add_qty))
            .bind(("price", new_price))
            .bind(("delta", delta))
            .bind(("now", now_millis()))
            .await?
            .check()?;
        Ok(())
    }

    /// Create a new line and move the order total by `delta`
    pub async fn insert_line(
        &self,
        order_id: &str,
        product_ref: &str,
        variant_ref: Option<String>,
        quantity: i64,
        price: f64,
        delta: f64,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "
                BEGIN TRANSACTION;
                CREATE order_item CONTENT {
                    order_id: $ord_ref, product_id: $product, variant_id: $variant,
                    quantity: $qty, price: $price
                };
                UPDATE $ord SET total_amount += $delta, updated_at = $now;
                COMMIT TRANSACTION;
                ",
            )
            .bind(("ord_ref", record_ref(ORDER_TABLE, order_id)))
            .bind(("ord", self.order_thing(order_id)))
            .bind(("product", product_ref.to_string()))
            .bind(("variant", variant_ref))
            .bind(("qty", quantity))
            .bind(("price", price))
            .bind(("delta", delta))
            .bind(("now", now_millis()))
            .await?
            .check()?;
        Ok(())
    }

    /// Set a line's quantity and move the order total by `delta`
    pub async fn set_line_quantity(
        &self,
        order_id: &str,
        item_id: &str,
        quantity: i64,
        delta: f64,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "
                BEGIN TRANSACTION;
                UPDATE $item SET quantity = $qty;
                UPDATE $ord SET total_amount += $delta, updated_at = $now;
                COMMIT TRANSACTION;
                ",
            )
            .bind(("item", self.item_thing(item_id)))
            .bind(("ord", self.order_thing(order_id)))
            .bind(("qty", quantity))
            .bind(("delta", delta))
            .bind(("now", now_millis()))
            .await?
            .check()?;
        Ok(())
    }

    /// Delete a line and decrease the order total by `amount`
    pub async fn remove_line(&self, order_id: &str, item_id: &str, amount: f64) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "
                BEGIN TRANSACTION;
                DELETE $item;
                UPDATE $ord SET total_amount -= $amount, updated_at = $now;
                COMMIT TRANSACTION;
                ",
            )
            .bind(("item", self.item_thing(item_id)))
            .bind(("ord", self.order_thing(order_id)))
            .bind(("amount", amount))
            .bind(("now", now_millis()))
            .await?
            .check()?;
        Ok(())
    }

    /// Delete all lines and zero the total
    pub async fn clear(&self, order_id: &str) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "
                BEGIN TRANSACTION;
                DELETE order_item WHERE order_id = $ord_ref;
                UPDATE $ord SET total_amount = $zero, updated_at = $now;
                COMMIT TRANSACTION;
                ",
            )
            .bind(("ord_ref", record_ref(ORDER_TABLE, order_id)))
            .bind(("ord", self.order_thing(order_id)))
            .bind(("zero", 0.0_f64))
            .bind(("now", now_millis()))
            .await?
            .check()?;
        Ok(())
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Append the conditional stock decrement statements to a script.
    ///
    /// Each decrement THROWs when the remaining stock is short, cancelling
    /// the surrounding transaction.
    fn push_decrements(script: &mut String, decrements: &[StockDecrement]) {
        for (i, dec) in decrements.iter().enumerate() {
            let col = dec.field.column();
            script.push_str(&format!(
                "LET $hit_{i} = (UPDATE $dec_{i} SET {col} -= $dq_{i} WHERE {col} >= $dq_{i} RETURN AFTER);\n\
                 IF array::len($hit_{i}) == 0 {{ THROW 'INSUFFICIENT_STOCK' }};\n"
            ));
        }
    }

    /// Commit an authenticated checkout: decrement stock, then stamp the open
    /// order with shipping fields, the recomputed total and the target status.
    pub async fn checkout_user(
        &self,
        order_id: &str,
        fields: &CheckoutFields,
        status: OrderStatus,
        total: f64,
        decrements: &[StockDecrement],
    ) -> RepoResult<Order> {
        let mut script = String::from("BEGIN TRANSACTION;\n");
        Self::push_decrements(&mut script, decrements);
        script.push_str(
            "UPDATE $ord SET status_id = $status, total_amount = $total, \
             shipping_method = $shipping_method, payment = $payment, \
             address_detail = $address_detail, ward = $ward, district = $district, \
             city = $city, updated_at = $now;\n\
             COMMIT TRANSACTION;",
        );

        let mut query = self
            .base
            .db()
            .query(script)
            .bind(("ord", self.order_thing(order_id)))
            .bind(("status", status))
            .bind(("total", total))
            .bind(("shipping_method", fields.shipping_method.clone()))
            .bind(("payment", fields.payment.clone()))
            .bind(("address_detail", fields.address_detail.clone()))
            .bind(("ward", fields.ward.clone()))
            .bind(("district", fields.district.clone()))
            .bind(("city", fields.city.clone()))
            .bind(("now", now_millis()));

        for (i, dec) in decrements.iter().enumerate() {
            query = query.bind((format!("dec_{i}"), dec.target.clone()));
            query = query.bind((format!("dq_{i}"), dec.quantity));
        }

        let mut response = query.await?;
        collect_errors(&mut response)?;

        self.find_by_id(order_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", order_id)))
    }

    /// Commit a guest checkout: decrement stock, create the order, its lines
    /// from the session cart, and the 1:1 guest contact record.
    pub async fn checkout_guest(
        &self,
        fields: &CheckoutFields,
        status: OrderStatus,
        total: f64,
        lines: &[GuestLine],
        guest: &GuestContact,
        decrements: &[StockDecrement],
    ) -> RepoResult<Order> {
        // Client-generated key so the committed order can be re-read without
        // parsing transaction results. Letter prefix keeps the key a plain
        // identifier (no angle-bracket escaping in the string form).
        let order_key = format!("o{}", Uuid::new_v4().simple());
        let order_thing = RecordId::from_table_key(ORDER_TABLE, order_key.as_str());
        let order_ref = format!("{}:{}", ORDER_TABLE, order_key);

        let mut script = String::from("BEGIN TRANSACTION;\n");
        Self::push_decrements(&mut script, decrements);
        script.push_str(
            "CREATE $ord CONTENT {
                user_id: NONE, status_id: $status, total_amount: $total,
                shipping_method: $shipping_method, payment: $payment,
                address_detail: $address_detail, ward: $ward, district: $district,
                city: $city, created_at: $now, updated_at: $now
            };\n",
        );
        for i in 0..lines.len() {
            script.push_str(&format!(
                "CREATE order_item CONTENT {{ \
                 order_id: $ord_ref, product_id: $lp_{i}, variant_id: $lv_{i}, \
                 quantity: $lq_{i}, price: $lpr_{i} }};\n"
            ));
        }
        script.push_str(
            "CREATE guest_order CONTENT {
                order_id: $ord_ref, name: $g_name, email: $g_email,
                phone_number: $g_phone, address_detail: $address_detail,
                ward: $ward, district: $district, city: $city
            };\n\
            COMMIT TRANSACTION;",
        );

        let mut query = self
            .base
            .db()
            .query(script)
            .bind(("ord", order_thing))
            .bind(("ord_ref", order_ref.clone()))
            .bind(("status", status))
            .bind(("total", total))
            .bind(("shipping_method", fields.shipping_method.clone()))
            .bind(("payment", fields.payment.clone()))
            .bind(("address_detail", fields.address_detail.clone()))
            .bind(("ward", fields.ward.clone()))
            .bind(("district", fields.district.clone()))
            .bind(("city", fields.city.clone()))
            .bind(("g_name", guest.name.clone()))
            .bind(("g_email", guest.email.clone()))
            .bind(("g_phone", guest.phone_number.clone()))
            .bind(("now", now_millis()));

        for (i, dec) in decrements.iter().enumerate() {
            query = query.bind((format!("dec_{i}"), dec.target.clone()));
            query = query.bind((format!("dq_{i}"), dec.quantity));
        }
        for (i, line) in lines.iter().enumerate() {
            query = query.bind((format!("lp_{i}"), line.product_ref.clone()));
            query = query.bind((format!("lv_{i}"), line.variant_ref.clone()));
            query = query.bind((format!("lq_{i}"), line.quantity));
            query = query.bind((format!("lpr_{i}"), line.price));
        }

        let mut response = query.await?;
        collect_errors(&mut response)?;

        self.find_by_id(&order_ref)
            .await?
            .ok_or_else(|| RepoError::Database("Guest order vanished after commit".to_string()))
    }

    /// The guest contact record for an order, if any
    pub async fn guest_order_for(&self, order_id: &str) -> RepoResult<Option<GuestOrder>> {
        let guests: Vec<GuestOrder> = self
            .base
            .db()
            .query("SELECT * FROM guest_order WHERE order_id = $ord LIMIT 1")
            .bind(("ord", record_ref(ORDER_TABLE, order_id)))
            .await?
            .take(0)?;
        Ok(guests.into_iter().next())
    }
}
