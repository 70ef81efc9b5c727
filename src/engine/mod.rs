// ==========================================
// 可可贸易测算台 - 测算层
// ==========================================
// 职责: 基于清洗表的查找与算术测算
// 规则: 输入表只读,每次测算产生新值；失败返回 CalcError,不 panic
// ==========================================

pub mod error;
pub mod freight;
pub mod fx;
pub mod products;
pub mod valuation;

// 重导出核心引擎
pub use error::{CalcError, CalcResult};
pub use freight::FreightEngine;
pub use fx::{AmountInput, FxEngine};
pub use products::{ProductCostingEngine, ProductCostingParams};
pub use valuation::ValuationEngine;
