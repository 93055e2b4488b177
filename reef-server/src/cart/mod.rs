//! 购物车模块
//!
//! 匿名会话购物车与登录用户数据库购物车共用一个 [`CartStore`] 能力：
//!
//! - [`EphemeralCartStore`] - 会话列表，商品/变体快照在加入时捕获
//! - [`PersistentCartStore`] - 用户 Open 订单的 order_item 行
//!
//! [`CartService`] 负责两种实现共同的决策逻辑：商品/变体解析、归属校验、
//! 库存校验、价格快照。

pub mod ephemeral;
pub mod persistent;
pub mod service;
pub mod session;
pub mod store;

pub use ephemeral::EphemeralCartStore;
pub use persistent::PersistentCartStore;
pub use service::CartService;
pub use session::SessionStore;
pub use store::{CartLine, CartLineView, CartStore, CartView, NewLine, ProductSummary, VariantSummary};
