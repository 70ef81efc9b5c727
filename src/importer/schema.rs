// ==========================================
// 可可贸易测算台 - 工作表列定义表
// ==========================================
// 职责: 每种工作表 → 列来源（表头别名或列序号）→ 标准列名 → 目标类型 → 是否必填
// 由 normalizer 统一解释执行
// ==========================================

use crate::domain::types::{ColumnType, SheetKind};

/// 标准列名
pub mod columns {
    pub const FX_PAIR: &str = "FX";
    pub const VALUE_DATE: &str = "VALUE DATE";
    pub const FX_RATE: &str = "FX RATE";
    pub const BEANS_EXTRA: &str = "Unnamed: 4";

    pub const ORIGIN: &str = "Origin";
    pub const DESTINATION: &str = "Destination";
    pub const FREIGHT_COST: &str = "FreightCost";

    pub const BUYING_DIFF: &str = "Buying Diff";
    pub const COSTINGS: &str = "Costings";
    pub const BREAK_EVEN: &str = "Break Even";
    pub const SELLING_DIFF: &str = "Selling Diff";
    pub const MARGIN: &str = "Margin";
}

/// 列来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// 按表头匹配,依次尝试各别名
    Labels(&'static [&'static str]),
    /// 按列序号（0 起）
    Position(usize),
}

/// 单列定义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub canonical: &'static str,
    pub source: ColumnSource,
    pub column_type: ColumnType,
    /// 转换后为缺失则整行丢弃
    pub required: bool,
}

/// 工作表定义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSchema {
    pub sheet_label: &'static str,
    pub columns: &'static [ColumnSpec],
    /// 任一列缺失即视为不可用
    pub require_all_columns: bool,
    pub missing_columns_message: &'static str,
}

impl SheetSchema {
    pub fn canonical_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.canonical).collect()
    }

    pub fn required_names(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.required)
            .map(|c| c.canonical)
            .collect()
    }
}

/// 清洗规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeRule {
    Schema(&'static SheetSchema),
    /// 无固定列定义,逐列尽力推断类型
    BestEffort { sheet_label: &'static str },
}

const fn spec(
    canonical: &'static str,
    source: ColumnSource,
    column_type: ColumnType,
    required: bool,
) -> ColumnSpec {
    ColumnSpec { canonical, source, column_type, required }
}

// ===== Costing Beans =====
pub static COSTING_BEANS_SCHEMA: SheetSchema = SheetSchema {
    sheet_label: "Costing Beans",
    columns: &[
        spec(columns::FX_PAIR, ColumnSource::Labels(&["FX"]), ColumnType::Text, true),
        spec(columns::VALUE_DATE, ColumnSource::Labels(&["VALUE DATE"]), ColumnType::Date, true),
        spec(columns::FX_RATE, ColumnSource::Labels(&["FX RATE"]), ColumnType::Decimal, true),
        spec(columns::BEANS_EXTRA, ColumnSource::Labels(&["Unnamed: 4"]), ColumnType::Decimal, true),
    ],
    require_all_columns: false,
    missing_columns_message: "Required columns for processing 'Costing Beans' not found.",
};

// ===== Market & FX Fix / Live =====
pub static FX_MARKET_SCHEMA: SheetSchema = SheetSchema {
    sheet_label: "FX",
    columns: &[
        spec(columns::FX_PAIR, ColumnSource::Labels(&["Quote Table", "FX"]), ColumnType::Text, true),
        spec(columns::VALUE_DATE, ColumnSource::Labels(&["Delivery", "VALUE DATE"]), ColumnType::Date, true),
        spec(columns::FX_RATE, ColumnSource::Labels(&["Last", "FX RATE"]), ColumnType::Decimal, true),
    ],
    require_all_columns: false,
    missing_columns_message:
        "Required columns for processing FX data not found (assuming 'Quote Table', 'Delivery', 'Last').",
};

// ===== Freight & Dressing =====
// 表头不可靠,按第 1、2、6 列取值
pub static FREIGHT_SCHEMA: SheetSchema = SheetSchema {
    sheet_label: "Freight & Dressing",
    columns: &[
        spec(columns::ORIGIN, ColumnSource::Position(0), ColumnType::Text, true),
        spec(columns::DESTINATION, ColumnSource::Position(1), ColumnType::Text, true),
        spec(columns::FREIGHT_COST, ColumnSource::Position(5), ColumnType::Decimal, true),
    ],
    require_all_columns: true,
    missing_columns_message:
        "Required columns for processing 'Freight & Dressing' not found (assuming first, second, and sixth columns).",
};

// ===== Valo Ori & Dest =====
pub static VALUATION_SCHEMA: SheetSchema = SheetSchema {
    sheet_label: "Valo Ori & Dest",
    columns: &[
        spec(columns::BUYING_DIFF, ColumnSource::Labels(&["Buying Diff"]), ColumnType::Decimal, false),
        spec(columns::COSTINGS, ColumnSource::Labels(&["Costings"]), ColumnType::Decimal, false),
        spec(columns::BREAK_EVEN, ColumnSource::Labels(&["Break Even"]), ColumnType::Decimal, true),
        spec(columns::SELLING_DIFF, ColumnSource::Labels(&["Selling Diff"]), ColumnType::Decimal, false),
        spec(columns::MARGIN, ColumnSource::Labels(&["Margin"]), ColumnType::Decimal, true),
    ],
    require_all_columns: false,
    missing_columns_message: "Required columns for processing 'Valo Ori & Dest' not found.",
};

/// 工作表种类 → 清洗规则
pub fn rule_for(kind: SheetKind) -> NormalizeRule {
    match kind {
        SheetKind::CostingBeans => NormalizeRule::Schema(&COSTING_BEANS_SCHEMA),
        SheetKind::FxFix | SheetKind::FxLive => NormalizeRule::Schema(&FX_MARKET_SCHEMA),
        SheetKind::Freight => NormalizeRule::Schema(&FREIGHT_SCHEMA),
        SheetKind::Valuation => NormalizeRule::Schema(&VALUATION_SCHEMA),
        SheetKind::CostingProducts => NormalizeRule::BestEffort {
            sheet_label: "Costing Products",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_for_every_kind() {
        for kind in SheetKind::ALL {
            match rule_for(kind) {
                NormalizeRule::Schema(schema) => assert!(!schema.columns.is_empty()),
                NormalizeRule::BestEffort { .. } => assert_eq!(kind, SheetKind::CostingProducts),
            }
        }
    }

    #[test]
    fn test_required_subsets() {
        assert_eq!(
            FX_MARKET_SCHEMA.required_names(),
            vec![columns::FX_PAIR, columns::VALUE_DATE, columns::FX_RATE]
        );
        assert_eq!(
            VALUATION_SCHEMA.required_names(),
            vec![columns::BREAK_EVEN, columns::MARGIN]
        );
    }
}
