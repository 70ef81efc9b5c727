// ==========================================
// 可可贸易测算台 - 产品成本测算（占位）
// ==========================================
// 成本公式尚未从工作簿中整理出来,目前只回显数据预览
// ==========================================

use crate::domain::records::ProductCostingReport;
use crate::domain::table::NormalizedTable;
use crate::domain::types::ErrorKind;
use crate::engine::error::CalcError;
use std::collections::BTreeMap;
use tracing::{info, instrument};

pub const NOT_IMPLEMENTED_MESSAGE: &str =
    "Costing Products calculation logic needs to be implemented based on the sheet's formulas.";

/// 产品成本测算参数（产品类型、产地、数量等,键值自由）
pub type ProductCostingParams = BTreeMap<String, String>;

#[derive(Debug, Default)]
pub struct ProductCostingEngine;

impl ProductCostingEngine {
    pub fn new() -> Self {
        Self
    }

    /// 恒返回无成本的 NotImplemented 报告,有无数据只影响提示文字与预览
    #[instrument(skip(self, table, params), fields(rows = table.height(), params = params.len()))]
    pub fn calculate_costing_products(
        &self,
        table: &NormalizedTable,
        params: &ProductCostingParams,
        preview_rows: usize,
    ) -> ProductCostingReport {
        let preview = table.head(preview_rows);

        let message = if table.is_empty() {
            CalcError::DataUnavailable { dataset: "Costing Products" }.to_string()
        } else {
            info!("产品成本测算尚未实现,返回数据预览");
            CalcError::NotImplemented(NOT_IMPLEMENTED_MESSAGE).to_string()
        };

        ProductCostingReport {
            cost: None,
            kind: ErrorKind::NotImplemented,
            message,
            preview,
        }
    }
}
