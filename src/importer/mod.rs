// ==========================================
// 可可贸易测算台 - 导入层
// ==========================================
// 职责: 工作簿读取 → 原始表 → 按 schema 清洗后的表
// 支持: Excel / OpenDocument（经 calamine）
// ==========================================

// 模块声明
pub mod coercion;
pub mod error;
pub mod file_parser;
pub mod normalizer;
pub mod schema;
pub mod sheet_loader;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{ExcelWorkbookReader, SheetSource, WorkbookReader};
pub use normalizer::{ColumnNormalizer, NormalizeOutcome};
pub use schema::{rule_for, NormalizeRule, SheetSchema};
pub use sheet_loader::{LoadReport, SheetLoad, SheetLoader};
