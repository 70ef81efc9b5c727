// ==========================================
// 可可贸易测算台 - 语义记录与测算结果
// ==========================================
// 由 NormalizedTable 行派生,仅在测算过程中存在
// ==========================================

use crate::domain::table::NormalizedTable;
use crate::domain::types::ErrorKind;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// FxQuote - 汇率报价
// ==========================================
// 同一货币对可有多条报价,按 value_date 取最新
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxQuote {
    pub pair: String,
    pub value_date: NaiveDateTime,
    pub rate: f64,
}

// ==========================================
// FreightRate - 运费费率
// ==========================================
// cost_per_unit 为 None 表示单元格非数值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightRate {
    pub origin: String,
    pub destination: String,
    pub cost_per_unit: Option<f64>,
}

// ==========================================
// ValuationRow - 估值行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRow {
    pub buying_diff: f64,
    pub costings: Option<f64>,
    pub selling_diff: Option<f64>,
    pub break_even: Option<f64>,
    pub margin: Option<f64>,
}

// ==========================================
// 测算结果
// ==========================================

/// 运费测算结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightQuote {
    pub total_cost: f64,
    pub rate_used: f64,
    pub quantity: f64,
}

impl FreightQuote {
    pub fn message(&self) -> String {
        format!("Calculated using rate {:.2} per MT.", self.rate_used)
    }
}

/// 汇率换算结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxConversion {
    pub converted: f64,
    pub rate: f64,
    pub value_date: NaiveDate,
}

impl FxConversion {
    pub fn message(&self) -> &'static str {
        "Conversion successful."
    }
}

/// 估值结果
///
/// break_even 只由调用方输入决定（buying_diff + costing）,
/// 不读取匹配行自身的 Costings / Break Even 列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub break_even: f64,
    pub margin: f64,
    pub matched_buying_diff: f64,
    pub selling_diff_used: f64,
}

impl ValuationResult {
    pub fn message(&self) -> String {
        format!(
            "Calculated using Selling Diff ({:.2}) from sheet.",
            self.selling_diff_used
        )
    }
}

/// 产品成本测算报告（占位）
///
/// cost 目前恒为 None,kind 恒为 NotImplemented；无数据时 message 提示数据不可用。
#[derive(Debug, Clone, Serialize)]
pub struct ProductCostingReport {
    pub cost: Option<f64>,
    pub kind: ErrorKind,
    pub message: String,
    pub preview: NormalizedTable,
}

impl ProductCostingReport {
    pub fn is_not_implemented(&self) -> bool {
        self.kind == ErrorKind::NotImplemented
    }
}
