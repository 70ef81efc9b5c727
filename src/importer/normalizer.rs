// ==========================================
// 可可贸易测算台 - 列清洗器
// ==========================================
// 职责: RawTable → NormalizedTable
// 流程: 定位列 → 重命名为标准列名 → 类型转换 → 丢弃必填缺失行
// 规则: 不向外抛错,列缺失或无有效行时得到空表 + 诊断消息
// ==========================================

use crate::domain::table::{NormalizedColumn, NormalizedTable, RawTable, TypedValue};
use crate::domain::types::{ColumnType, SheetKind, StatusMessage};
use crate::importer::coercion::{cell_to_date, cell_to_decimal, cell_to_text, coerce_cell};
use crate::importer::schema::{rule_for, ColumnSource, ColumnSpec, NormalizeRule, SheetSchema};
use crate::perf::PerfGuard;
use tracing::{debug, warn};

/// 清洗结果
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOutcome {
    pub table: NormalizedTable,
    pub diagnostic: Option<StatusMessage>,
}

impl NormalizeOutcome {
    fn ok(table: NormalizedTable) -> Self {
        Self { table, diagnostic: None }
    }

    fn with_diagnostic(table: NormalizedTable, diagnostic: StatusMessage) -> Self {
        Self { table, diagnostic: Some(diagnostic) }
    }
}

/// 已定位的列: 定义 + 原表列号
struct ResolvedColumn<'a> {
    spec: &'a ColumnSpec,
    index: usize,
}

pub struct ColumnNormalizer;

impl ColumnNormalizer {
    /// 按工作表种类清洗
    pub fn normalize(&self, kind: SheetKind, raw: &RawTable) -> NormalizeOutcome {
        self.normalize_with_rule(rule_for(kind), raw)
    }

    pub fn normalize_with_rule(&self, rule: NormalizeRule, raw: &RawTable) -> NormalizeOutcome {
        let label = match rule {
            NormalizeRule::Schema(schema) => schema.sheet_label,
            NormalizeRule::BestEffort { sheet_label } => sheet_label,
        };
        let mut perf = PerfGuard::new("normalize").with_detail(label);

        // 未加载或无数据: 直接得到不可用表,不额外提示
        if raw.is_empty() {
            debug!(sheet = label, "原始表为空,跳过清洗");
            return NormalizeOutcome::ok(NormalizedTable::unavailable());
        }

        let outcome = match rule {
            NormalizeRule::Schema(schema) => self.apply_schema(schema, raw),
            NormalizeRule::BestEffort { .. } => NormalizeOutcome::ok(self.best_effort(raw)),
        };

        if let Some(diagnostic) = &outcome.diagnostic {
            warn!(sheet = label, message = %diagnostic.message, "清洗诊断");
        }
        perf.set_rows(outcome.table.height());
        outcome
    }

    // ==========================================
    // 固定 schema 清洗
    // ==========================================
    fn apply_schema(&self, schema: &SheetSchema, raw: &RawTable) -> NormalizeOutcome {
        let resolved = resolve_columns(schema, raw);
        let all_found = resolved.len() == schema.columns.len();
        if resolved.is_empty() || (schema.require_all_columns && !all_found) {
            return NormalizeOutcome::with_diagnostic(
                NormalizedTable::unavailable(),
                StatusMessage::warning(schema.missing_columns_message),
            );
        }

        // 必填列一个都不在: 无法判定有效行
        let required_present: Vec<usize> = resolved
            .iter()
            .enumerate()
            .filter(|(_, c)| c.spec.required)
            .map(|(pos, _)| pos)
            .collect();
        if required_present.is_empty() && schema.columns.iter().any(|c| c.required) {
            return NormalizeOutcome::with_diagnostic(
                NormalizedTable::unavailable(),
                StatusMessage::warning(schema.missing_columns_message),
            );
        }

        let columns: Vec<NormalizedColumn> = resolved
            .iter()
            .map(|c| NormalizedColumn::new(c.spec.canonical, c.spec.column_type))
            .collect();

        let mut dropped = 0usize;
        let mut rows = Vec::with_capacity(raw.height());
        for row_idx in 0..raw.height() {
            let row: Vec<TypedValue> = resolved
                .iter()
                .map(|c| coerce_cell(raw.cell(row_idx, c.index), c.spec.column_type))
                .collect();

            if required_present.iter().any(|&pos| row[pos].is_missing()) {
                dropped += 1;
                continue;
            }
            rows.push(row);
        }

        debug!(
            sheet = schema.sheet_label,
            kept = rows.len(),
            dropped,
            "schema 清洗完成"
        );

        if rows.is_empty() {
            return NormalizeOutcome::with_diagnostic(
                NormalizedTable::with_columns(columns),
                StatusMessage::warning(format!(
                    "No valid rows in '{}' after processing required columns.",
                    schema.sheet_label
                )),
            );
        }

        NormalizeOutcome::ok(NormalizedTable::new(columns, rows))
    }

    // ==========================================
    // 无 schema 的尽力推断（Costing Products）
    // ==========================================
    // 逐列: 数值 → 日期 → 字符串,不丢行
    fn best_effort(&self, raw: &RawTable) -> NormalizedTable {
        let height = raw.height();
        let mut columns = Vec::with_capacity(raw.width());
        let mut data: Vec<Vec<TypedValue>> = Vec::with_capacity(raw.width());

        for (col_idx, header) in raw.headers().iter().enumerate() {
            let cells: Vec<_> = (0..height).map(|r| raw.cell(r, col_idx)).collect();

            let decimals: Vec<TypedValue> = cells.iter().map(|c| cell_to_decimal(c)).collect();
            let (column_type, values) = if !all_missing(&decimals) {
                (ColumnType::Decimal, decimals)
            } else {
                let dates: Vec<TypedValue> = cells.iter().map(|c| cell_to_date(c)).collect();
                if !all_missing(&dates) {
                    (ColumnType::Date, dates)
                } else {
                    (ColumnType::Text, cells.iter().map(|c| cell_to_text(c)).collect())
                }
            };

            columns.push(NormalizedColumn::new(header.clone(), column_type));
            data.push(values);
        }

        // 列存储 → 行存储
        let rows = (0..height)
            .map(|r| data.iter().map(|col| col[r].clone()).collect())
            .collect();

        NormalizedTable::new(columns, rows)
    }
}

fn all_missing(values: &[TypedValue]) -> bool {
    values.iter().all(TypedValue::is_missing)
}

/// 定位 schema 中实际存在的列（保持 schema 顺序）
fn resolve_columns<'a>(schema: &'a SheetSchema, raw: &RawTable) -> Vec<ResolvedColumn<'a>> {
    schema
        .columns
        .iter()
        .filter_map(|spec| {
            let index = match spec.source {
                ColumnSource::Labels(labels) => {
                    labels.iter().find_map(|label| raw.column_index(label))
                }
                ColumnSource::Position(pos) if pos < raw.width() => Some(pos),
                ColumnSource::Position(_) => None,
            };
            index.map(|index| ResolvedColumn { spec, index })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CellValue, StatusLevel};
    use crate::importer::schema::columns;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fx_market_renames_and_drops() {
        let raw = RawTable::new(
            headers(&["Quote Table", "Delivery", "Last", "Comment"]),
            vec![
                vec![text("EURUSD"), text("2024-01-01"), CellValue::Number(1.10), text("a")],
                vec![text("EURUSD"), text("not a date"), CellValue::Number(1.11), text("b")],
                vec![text("GBPUSD"), text("2024-01-01"), text("n/a"), text("c")],
            ],
        );

        let outcome = ColumnNormalizer.normalize(SheetKind::FxFix, &raw);
        assert!(outcome.diagnostic.is_none());
        assert_eq!(
            outcome.table.column_names(),
            vec![columns::FX_PAIR, columns::VALUE_DATE, columns::FX_RATE]
        );
        assert_eq!(outcome.table.height(), 1);
        assert_eq!(outcome.table.value(0, columns::FX_RATE), &TypedValue::Decimal(1.10));
    }

    #[test]
    fn test_freight_needs_six_columns() {
        let raw = RawTable::new(
            headers(&["Origin", "Destination", "c", "d", "e"]),
            vec![vec![text("Ghana"), text("Amsterdam")]],
        );

        let outcome = ColumnNormalizer.normalize(SheetKind::Freight, &raw);
        assert!(outcome.table.is_unavailable());
        let diagnostic = outcome.diagnostic.unwrap();
        assert_eq!(diagnostic.level, StatusLevel::Warning);
        assert!(diagnostic.message.contains("first, second, and sixth columns"));
    }

    #[test]
    fn test_overflow_cells_do_not_break_schema_columns() {
        let mut rows = vec![vec![text("EURUSD"), text("2024-01-01"), CellValue::Number(1.1)]];
        rows[0].push(text("overflow"));
        let raw = RawTable::new(headers(&["Quote Table", "Delivery", "Last"]), rows);

        let outcome = ColumnNormalizer.normalize(SheetKind::FxLive, &raw);
        assert!(outcome.diagnostic.is_none());
        assert_eq!(outcome.table.height(), 1);
        assert_eq!(outcome.table.value(0, columns::FX_RATE), &TypedValue::Decimal(1.1));
    }

    #[test]
    fn test_best_effort_types() {
        let raw = RawTable::new(
            headers(&["Product", "Qty", "Ship Date"]),
            vec![
                vec![text("Butter"), CellValue::Number(10.0), text("2024-03-01")],
                vec![text("Powder"), text("x"), text("2024-04-01")],
            ],
        );

        let outcome = ColumnNormalizer.normalize(SheetKind::CostingProducts, &raw);
        let types: Vec<ColumnType> = outcome.table.columns().iter().map(|c| c.column_type).collect();
        assert_eq!(types, vec![ColumnType::Text, ColumnType::Decimal, ColumnType::Date]);
        assert_eq!(outcome.table.height(), 2);
        assert!(outcome.table.value(1, "Qty").is_missing());
    }

    #[test]
    fn test_empty_raw_is_unavailable() {
        let outcome = ColumnNormalizer.normalize(SheetKind::Valuation, &RawTable::empty());
        assert!(outcome.table.is_unavailable());
        assert!(outcome.diagnostic.is_none());
    }
}
