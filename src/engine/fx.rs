// ==========================================
// 可可贸易测算台 - 汇率换算引擎
// ==========================================
// 输入: FX 清洗表（Fix / Live / Costing Beans）+ 货币对 + 金额
// 匹配: 货币对区分大小写精确匹配（与运费的子串匹配不同）
// 取值: value_date 最大的报价；同日多条取表内靠前者
// ==========================================

use crate::domain::records::{FxConversion, FxQuote};
use crate::domain::table::NormalizedTable;
use crate::engine::error::{CalcError, CalcResult};
use crate::importer::coercion::{parse_number_text, recoerce_date, recoerce_decimal};
use crate::importer::schema::columns;
use tracing::{debug, instrument};

const REQUIRED_COLUMNS: [&str; 3] = [columns::FX_PAIR, columns::VALUE_DATE, columns::FX_RATE];

// ==========================================
// 换算金额输入
// ==========================================
/// 可转换为金额的用户输入（数值或文本框内容）
pub trait AmountInput {
    fn to_amount(&self) -> Option<f64>;

    /// 出错提示中回显的原始输入
    fn describe(&self) -> String;
}

impl AmountInput for f64 {
    fn to_amount(&self) -> Option<f64> {
        Some(*self).filter(|v| !v.is_nan())
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl AmountInput for i64 {
    fn to_amount(&self) -> Option<f64> {
        Some(*self as f64)
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl AmountInput for &str {
    fn to_amount(&self) -> Option<f64> {
        parse_number_text(self)
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl AmountInput for String {
    fn to_amount(&self) -> Option<f64> {
        parse_number_text(self)
    }

    fn describe(&self) -> String {
        self.clone()
    }
}

impl<T: AmountInput> AmountInput for Option<T> {
    fn to_amount(&self) -> Option<f64> {
        self.as_ref().and_then(AmountInput::to_amount)
    }

    fn describe(&self) -> String {
        self.as_ref().map(AmountInput::describe).unwrap_or_default()
    }
}

// ==========================================
// FxEngine
// ==========================================
#[derive(Debug, Default)]
pub struct FxEngine;

impl FxEngine {
    pub fn new() -> Self {
        Self
    }

    /// 换算金额 = 金额 × 最新汇率
    #[instrument(skip(self, table, amount), fields(rows = table.height()))]
    pub fn perform_currency_conversion<A: AmountInput>(
        &self,
        table: &NormalizedTable,
        pair: &str,
        amount: A,
    ) -> CalcResult<FxConversion> {
        if table.is_empty() {
            return Err(CalcError::DataUnavailable { dataset: "FX" });
        }
        if !table.has_columns(&REQUIRED_COLUMNS) {
            return Err(CalcError::SchemaMissing {
                calculation: "FX conversion",
                hint: "",
            });
        }

        let pair_rows = self.pair_rows(table, pair);
        if pair_rows.is_empty() {
            return Err(CalcError::PairNotFound(pair.to_string()));
        }

        let quotes = self.quotes_from_rows(table, pair, &pair_rows);
        let latest = latest_quote(&quotes).ok_or_else(|| CalcError::NoValidQuotes(pair.to_string()))?;

        let value = amount
            .to_amount()
            .ok_or_else(|| CalcError::InvalidAmount(amount.describe()))?;

        debug!(pair, rate = latest.rate, date = %latest.value_date, "选用最新汇率");

        Ok(FxConversion {
            converted: value * latest.rate,
            rate: latest.rate,
            value_date: latest.value_date.date(),
        })
    }

    /// 货币对的历史报价（按日期升序,同日保持表内顺序）
    pub fn fx_history(&self, table: &NormalizedTable, pair: &str) -> Vec<FxQuote> {
        if !table.has_columns(&REQUIRED_COLUMNS) {
            return Vec::new();
        }

        let rows = self.pair_rows(table, pair);
        let mut quotes = self.quotes_from_rows(table, pair, &rows);
        quotes.sort_by_key(|q| q.value_date);
        quotes
    }

    /// 可选货币对（去重,保持首次出现顺序）
    pub fn fx_pairs(&self, table: &NormalizedTable) -> Vec<String> {
        table.distinct_values(columns::FX_PAIR)
    }

    fn pair_rows(&self, table: &NormalizedTable, pair: &str) -> Vec<usize> {
        (0..table.height())
            .filter(|&row| table.value(row, columns::FX_PAIR).to_string() == pair)
            .collect()
    }

    /// 重新转换日期与汇率,缺失者丢弃
    fn quotes_from_rows(&self, table: &NormalizedTable, pair: &str, rows: &[usize]) -> Vec<FxQuote> {
        rows.iter()
            .filter_map(|&row| {
                let value_date = recoerce_date(table.value(row, columns::VALUE_DATE))?;
                let rate = recoerce_decimal(table.value(row, columns::FX_RATE))?;
                Some(FxQuote {
                    pair: pair.to_string(),
                    value_date,
                    rate,
                })
            })
            .collect()
    }
}

/// 日期最大者；同日取先出现者
fn latest_quote(quotes: &[FxQuote]) -> Option<&FxQuote> {
    let mut latest: Option<&FxQuote> = None;
    for quote in quotes {
        match latest {
            Some(current) if quote.value_date <= current.value_date => {}
            _ => latest = Some(quote),
        }
    }
    latest
}
