// ==========================================
// 可可贸易测算台 - 领域模型层
// ==========================================
// 职责: 定义表格模型、单元格类型、语义记录与测算结果
// 红线: 不含文件访问逻辑,不含测算逻辑
// ==========================================

pub mod records;
pub mod table;
pub mod types;

// 重导出核心类型
pub use records::{
    FreightQuote, FreightRate, FxConversion, FxQuote, ProductCostingReport, ValuationResult,
    ValuationRow,
};
pub use table::{NormalizedColumn, NormalizedTable, RawTable, TypedValue};
pub use types::{CellValue, ColumnType, ErrorKind, SheetKind, StatusLevel, StatusMessage};
