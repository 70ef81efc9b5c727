// ==========================================
// 可可贸易测算台 - 核心库
// ==========================================
// 技术栈: Rust + calamine（工作簿读取）
// 系统定位: 单用户测算看板,工作簿只读
// 数据流: 工作簿 → 加载 → 原始表 → 清洗 → 测算 → 展示
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 表格模型与测算结果
pub mod domain;

// 导入层 - 工作簿读取与列清洗
pub mod importer;

// 引擎层 - 运费 / 汇率 / 估值 / 产品成本
pub mod engine;

// 配置层 - 测算台配置
pub mod config;

// 应用层 - 会话上下文与缓存
pub mod app;

// API 层 - 看板分区接口
pub mod api;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CellValue, ColumnType, ErrorKind, NormalizedTable, RawTable, SheetKind, StatusLevel,
    StatusMessage, TypedValue,
};

// 导入
pub use importer::{ColumnNormalizer, ImportError, LoadReport, SheetLoader};

// 引擎
pub use engine::{CalcError, FreightEngine, FxEngine, ProductCostingEngine, ValuationEngine};

// 配置 / 会话 / API
pub use api::DashboardApi;
pub use app::DeskSession;
pub use config::DeskConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Cocoa Trading Desk";
