// ==========================================
// 可可贸易测算台 - 估值引擎
// ==========================================
// 输入: Valo Ori & Dest 清洗表 + 买入升贴水 + 总成本
// 匹配: Buying Diff 与输入最接近的行（同距取靠前者）
// 计算:
// - break_even = 输入买入升贴水 + 输入成本
// - margin = 命中行 Selling Diff - break_even
// 命中行自身的 Costings / Break Even 列不参与计算
// 输入须为有限数,NaN / ±inf 直接拒绝
// ==========================================

use crate::domain::records::{ValuationResult, ValuationRow};
use crate::domain::table::NormalizedTable;
use crate::engine::error::{CalcError, CalcResult};
use crate::importer::coercion::recoerce_decimal;
use crate::importer::schema::columns;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
pub struct ValuationEngine;

impl ValuationEngine {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, table), fields(rows = table.height()))]
    pub fn calculate_valuation(
        &self,
        table: &NormalizedTable,
        buying_diff: f64,
        costing: f64,
    ) -> CalcResult<ValuationResult> {
        if !buying_diff.is_finite() {
            return Err(CalcError::NonFiniteInput { field: "Buying Diff" });
        }
        if !costing.is_finite() {
            return Err(CalcError::NonFiniteInput { field: "Costing" });
        }

        if table.is_empty() {
            return Err(CalcError::DataUnavailable { dataset: "Valuation" });
        }
        if !table.has_columns(&[columns::BUYING_DIFF, columns::SELLING_DIFF]) {
            return Err(CalcError::SchemaMissing {
                calculation: "valuation calculation",
                hint: " ('Buying Diff', 'Selling Diff')",
            });
        }

        let rows = self.valuation_rows(table);
        let closest = nearest_row(&rows, buying_diff).ok_or(CalcError::NoValidRows)?;
        let selling_diff = closest.selling_diff.ok_or(CalcError::NonNumericSellingDiff)?;

        let break_even = buying_diff + costing;
        let margin = selling_diff - break_even;

        debug!(
            matched_buying_diff = closest.buying_diff,
            selling_diff,
            break_even,
            margin,
            "估值完成"
        );

        Ok(ValuationResult {
            break_even,
            margin,
            matched_buying_diff: closest.buying_diff,
            selling_diff_used: selling_diff,
        })
    }

    /// Buying Diff 可转为数值的行（保持表内顺序）
    pub fn valuation_rows(&self, table: &NormalizedTable) -> Vec<ValuationRow> {
        let decimal = |row: usize, col: &str| recoerce_decimal(table.value(row, col));

        (0..table.height())
            .filter_map(|row| {
                Some(ValuationRow {
                    buying_diff: decimal(row, columns::BUYING_DIFF)?,
                    costings: decimal(row, columns::COSTINGS),
                    selling_diff: decimal(row, columns::SELLING_DIFF),
                    break_even: decimal(row, columns::BREAK_EVEN),
                    margin: decimal(row, columns::MARGIN),
                })
            })
            .collect()
    }
}

/// 绝对差最小者；同距取先出现者
fn nearest_row(rows: &[ValuationRow], target: f64) -> Option<&ValuationRow> {
    let mut best: Option<(&ValuationRow, f64)> = None;
    for row in rows {
        let distance = (row.buying_diff - target).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((row, distance)),
        }
    }
    best.map(|(row, _)| row)
}
