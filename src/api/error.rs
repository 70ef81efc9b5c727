// ==========================================
// 可可贸易测算台 - API层错误类型
// ==========================================
// 职责: 展示层入参错误与导出错误
// 测算失败不走此类型,而是以诊断消息随结果返回
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 入参错误
    // ==========================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange { start: String, end: String },

    // ==========================================
    // 导出错误
    // ==========================================
    #[error("Failed to export '{sheet}': {source}")]
    Export {
        sheet: String,
        #[source]
        source: csv::Error,
    },
}

/// API 层 Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
