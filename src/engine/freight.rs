// ==========================================
// 可可贸易测算台 - 运费测算引擎
// ==========================================
// 输入: Freight & Dressing 清洗表 + 起运地/目的地/吨数
// 匹配: 起运地、目的地均为不区分大小写的子串匹配
// 取值: 按表内行序第一条数值费率（多条命中时不取均值、不择优）
// ==========================================

use crate::domain::records::{FreightQuote, FreightRate};
use crate::domain::table::NormalizedTable;
use crate::engine::error::{CalcError, CalcResult};
use crate::importer::coercion::{recoerce_decimal, recoerce_text};
use crate::importer::schema::columns;
use tracing::{debug, instrument};

const REQUIRED_COLUMNS: [&str; 3] = [columns::ORIGIN, columns::DESTINATION, columns::FREIGHT_COST];

#[derive(Debug, Default)]
pub struct FreightEngine;

impl FreightEngine {
    pub fn new() -> Self {
        Self
    }

    /// 运费 = 首条命中费率 × 吨数
    #[instrument(skip(self, table), fields(rows = table.height()))]
    pub fn calculate_freight_cost(
        &self,
        table: &NormalizedTable,
        origin: &str,
        destination: &str,
        quantity: f64,
    ) -> CalcResult<FreightQuote> {
        if table.is_empty() {
            return Err(CalcError::DataUnavailable { dataset: "Freight" });
        }
        if !table.has_columns(&REQUIRED_COLUMNS) {
            return Err(CalcError::SchemaMissing {
                calculation: "freight calculation",
                hint: "",
            });
        }

        let matches = self.matching_rates(table, origin, destination);
        if matches.is_empty() {
            return Err(CalcError::NoRateFound {
                origin: origin.to_string(),
                destination: destination.to_string(),
            });
        }

        let rate = matches
            .iter()
            .find_map(|r| r.cost_per_unit)
            .ok_or(CalcError::NonNumericRate)?;

        debug!(matched = matches.len(), rate, "运费费率命中");

        Ok(FreightQuote {
            total_cost: rate * quantity,
            rate_used: rate,
            quantity,
        })
    }

    /// 表中全部费率行（缺失的起运地/目的地不参与匹配）
    pub fn freight_rates(&self, table: &NormalizedTable) -> Vec<FreightRate> {
        (0..table.height())
            .filter_map(|row| {
                let origin = recoerce_text(table.value(row, columns::ORIGIN))?;
                let destination = recoerce_text(table.value(row, columns::DESTINATION))?;
                Some(FreightRate {
                    origin,
                    destination,
                    cost_per_unit: recoerce_decimal(table.value(row, columns::FREIGHT_COST)),
                })
            })
            .collect()
    }

    fn matching_rates(
        &self,
        table: &NormalizedTable,
        origin: &str,
        destination: &str,
    ) -> Vec<FreightRate> {
        let origin = origin.to_lowercase();
        let destination = destination.to_lowercase();

        self.freight_rates(table)
            .into_iter()
            .filter(|r| {
                r.origin.to_lowercase().contains(&origin)
                    && r.destination.to_lowercase().contains(&destination)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::{NormalizedColumn, TypedValue};
    use crate::domain::types::ColumnType;

    fn freight_table(rows: Vec<(&str, &str, TypedValue)>) -> NormalizedTable {
        NormalizedTable::new(
            vec![
                NormalizedColumn::new(columns::ORIGIN, ColumnType::Text),
                NormalizedColumn::new(columns::DESTINATION, ColumnType::Text),
                NormalizedColumn::new(columns::FREIGHT_COST, ColumnType::Decimal),
            ],
            rows.into_iter()
                .map(|(o, d, c)| vec![TypedValue::Text(o.to_string()), TypedValue::Text(d.to_string()), c])
                .collect(),
        )
    }

    #[test]
    fn test_case_insensitive_substring() {
        let table = freight_table(vec![("Ghana (Tema)", "Amsterdam", TypedValue::Decimal(45.0))]);
        let quote = FreightEngine::new()
            .calculate_freight_cost(&table, "ghana", "AMSTER", 100.0)
            .unwrap();
        assert_eq!(quote.total_cost, 4500.0);
        assert_eq!(quote.message(), "Calculated using rate 45.00 per MT.");
    }

    #[test]
    fn test_first_numeric_match_wins() {
        let table = freight_table(vec![
            ("Ghana", "Amsterdam", TypedValue::Text("tbc".to_string())),
            ("Ghana", "Amsterdam", TypedValue::Decimal(50.0)),
            ("Ghana", "Amsterdam", TypedValue::Decimal(40.0)),
        ]);
        let quote = FreightEngine::new()
            .calculate_freight_cost(&table, "Ghana", "Amsterdam", 10.0)
            .unwrap();
        assert_eq!(quote.rate_used, 50.0);
    }

    #[test]
    fn test_non_numeric_rate() {
        let table = freight_table(vec![("Ghana", "Amsterdam", TypedValue::Missing)]);
        let err = FreightEngine::new()
            .calculate_freight_cost(&table, "Ghana", "Amsterdam", 10.0)
            .unwrap_err();
        assert_eq!(err, CalcError::NonNumericRate);
    }

    #[test]
    fn test_no_rate_found() {
        let table = freight_table(vec![("Ghana", "Amsterdam", TypedValue::Decimal(45.0))]);
        let err = FreightEngine::new()
            .calculate_freight_cost(&table, "Ecuador", "Hamburg", 10.0)
            .unwrap_err();
        assert_eq!(err.to_string(), "No freight rate found for Ecuador to Hamburg.");
    }

    #[test]
    fn test_schema_missing() {
        let table = NormalizedTable::new(
            vec![NormalizedColumn::new(columns::ORIGIN, ColumnType::Text)],
            vec![vec![TypedValue::Text("Ghana".to_string())]],
        );
        let err = FreightEngine::new()
            .calculate_freight_cost(&table, "Ghana", "Amsterdam", 10.0)
            .unwrap_err();
        assert_eq!(err.to_string(), "Required columns for freight calculation not found.");
    }
}
