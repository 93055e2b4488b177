//! 商品目录领域逻辑
//!
//! - [`combinations`] - 属性值笛卡尔积展开、SKU 派生、对账计划 (纯函数)
//! - [`generator`] - 变体生成编排：加载属性、展开、落库

pub mod combinations;
pub mod generator;

pub use combinations::{Selection, expand_combinations, plan_reconcile, sku_for};
pub use generator::{AttributeSelection, GenerateVariantsRequest, generate_variants};
