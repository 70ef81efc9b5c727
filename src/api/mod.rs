// ==========================================
// 可可贸易测算台 - API 层
// ==========================================
// 职责: 提供看板分区接口,供命令行展示层调用
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod view;

// 重导出核心类型
pub use dashboard_api::{
    BeansView, ConversionView, DashboardApi, FreightOptions, FreightView, FxHistoryPoint,
    FxHistoryView, FxSource, SheetInfoView, SheetPreview, ValuationView,
};
pub use error::{ApiError, ApiResult};
