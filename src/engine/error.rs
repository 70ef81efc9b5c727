// ==========================================
// 可可贸易测算台 - 测算层错误类型
// ==========================================
// Display 文本即展示给用户的诊断消息
// ==========================================

use crate::domain::types::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    // ===== 输入表错误 =====
    #[error("{dataset} data not available.")]
    DataUnavailable { dataset: &'static str },

    #[error("Required columns for {calculation} not found{hint}.")]
    SchemaMissing {
        calculation: &'static str,
        hint: &'static str,
    },

    // ===== 运费 =====
    #[error("No freight rate found for {origin} to {destination}.")]
    NoRateFound { origin: String, destination: String },

    #[error("Freight rate found but is not numeric.")]
    NonNumericRate,

    // ===== 汇率 =====
    #[error("No data available for the selected FX pair '{0}'.")]
    PairNotFound(String),

    #[error("No valid date or FX rate data for the selected FX pair '{0}'.")]
    NoValidQuotes(String),

    #[error("Invalid value to convert.")]
    InvalidAmount(String),

    // ===== 估值 =====
    #[error("{field} must be a finite number.")]
    NonFiniteInput { field: &'static str },

    #[error("Valuation data empty after processing 'Buying Diff'.")]
    NoValidRows,

    #[error("Selling Diff from sheet is not numeric.")]
    NonNumericSellingDiff,

    // ===== 占位 =====
    #[error("{0}")]
    NotImplemented(&'static str),
}

impl CalcError {
    /// 映射到统一错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::DataUnavailable { .. } | CalcError::SchemaMissing { .. } => {
                ErrorKind::SchemaMissing
            }
            CalcError::NoRateFound { .. } | CalcError::PairNotFound(_) => ErrorKind::NoMatchFound,
            CalcError::NonNumericRate
            | CalcError::NoValidQuotes(_)
            | CalcError::NoValidRows
            | CalcError::NonNumericSellingDiff => ErrorKind::NonNumericValue,
            CalcError::InvalidAmount(_) | CalcError::NonFiniteInput { .. } => {
                ErrorKind::InvalidInput
            }
            CalcError::NotImplemented(_) => ErrorKind::NotImplemented,
        }
    }
}

/// Result 类型别名
pub type CalcResult<T> = Result<T, CalcError>;
