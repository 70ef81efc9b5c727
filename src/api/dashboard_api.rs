// ==========================================
// 可可贸易测算台 - 驾驶舱 API
// ==========================================
// 职责: 每个看板分区一个方法,组合会话中的清洗表与测算引擎
// 分区: 加载状态 / 汇率与换算 / 运费 / Costing Beans / 估值 / 产品成本 / 其他工作表
// 架构: 展示层 → DashboardApi → DeskSession（缓存）→ 导入层 / 测算层
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::view::{column_info, render_raw_preview, ColumnInfo};
use crate::app::session::DeskSession;
use crate::domain::records::ProductCostingReport;
use crate::domain::table::NormalizedTable;
use crate::domain::types::{SheetKind, StatusMessage};
use crate::engine::fx::AmountInput;
use crate::engine::products::ProductCostingParams;
use crate::engine::{FreightEngine, FxEngine, ProductCostingEngine, ValuationEngine};
use crate::importer::coercion::recoerce_date;
use crate::importer::file_parser::{ExcelWorkbookReader, WorkbookReader};
use crate::importer::schema::columns;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use tracing::{info, instrument};

// ==========================================
// 分区 DTO
// ==========================================

/// 汇率数据来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FxSource {
    Fix,
    Live,
    Beans,
}

impl FxSource {
    pub fn sheet_kind(&self) -> SheetKind {
        match self {
            FxSource::Fix => SheetKind::FxFix,
            FxSource::Live => SheetKind::FxLive,
            FxSource::Beans => SheetKind::CostingBeans,
        }
    }
}

impl std::str::FromStr for FxSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fix" => Ok(FxSource::Fix),
            "live" => Ok(FxSource::Live),
            "beans" => Ok(FxSource::Beans),
            other => Err(format!("unknown FX source: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FxHistoryPoint {
    pub date: NaiveDate,
    pub rate: f64,
}

/// 折线图数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FxHistoryView {
    pub source: FxSource,
    pub pair: String,
    pub points: Vec<FxHistoryPoint>,
    pub diagnostic: Option<StatusMessage>,
}

/// 换算结果 + 诊断
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionView {
    pub source: FxSource,
    pub pair: String,
    pub converted: Option<f64>,
    pub rate: Option<f64>,
    pub value_date: Option<NaiveDate>,
    pub status: StatusMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeansView {
    pub pair: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub rows: NormalizedTable,
    pub conversion: Option<ConversionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreightOptions {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreightView {
    pub origin: String,
    pub destination: String,
    pub quantity: f64,
    pub total_cost: Option<f64>,
    pub rate: Option<f64>,
    pub status: StatusMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationView {
    pub buying_diff: f64,
    pub costing: f64,
    pub break_even: Option<f64>,
    pub margin: Option<f64>,
    pub status: StatusMessage,
}

/// 清洗表预览
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetPreview {
    pub kind: SheetKind,
    pub sheet: String,
    pub table: NormalizedTable,
    pub diagnostic: Option<StatusMessage>,
}

/// 其他工作表概况（原始表）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetInfoView {
    pub sheet: String,
    pub loaded: bool,
    pub rows: usize,
    pub preview: String,
    pub columns: Vec<ColumnInfo>,
    pub warning: Option<StatusMessage>,
}

// ==========================================
// DashboardApi
// ==========================================
pub struct DashboardApi<R: WorkbookReader = ExcelWorkbookReader> {
    session: DeskSession<R>,
    fx: FxEngine,
    freight: FreightEngine,
    valuation: ValuationEngine,
    products: ProductCostingEngine,
}

impl<R: WorkbookReader> DashboardApi<R> {
    pub fn new(session: DeskSession<R>) -> Self {
        Self {
            session,
            fx: FxEngine::new(),
            freight: FreightEngine::new(),
            valuation: ValuationEngine::new(),
            products: ProductCostingEngine::new(),
        }
    }

    pub fn session(&self) -> &DeskSession<R> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DeskSession<R> {
        &mut self.session
    }

    fn preview_rows(&self) -> usize {
        self.session.config().preview_rows
    }

    fn sheet_name(&self, kind: SheetKind) -> String {
        self.session.config().sheets.name_for(kind).to_string()
    }

    fn unavailable_warning(&self, kind: SheetKind) -> StatusMessage {
        StatusMessage::warning(format!(
            "Could not load or process '{}' data.",
            self.sheet_name(kind)
        ))
    }

    fn table(&mut self, kind: SheetKind) -> NormalizedTable {
        self.session.normalized(kind).table.clone()
    }

    // ==========================================
    // 加载状态
    // ==========================================

    /// 每张表的加载状态（侧栏）
    pub fn load_statuses(&mut self) -> Vec<StatusMessage> {
        self.session.load_report().statuses()
    }

    /// 各表清洗诊断（无诊断的表不列出）
    pub fn normalization_diagnostics(&mut self) -> Vec<(SheetKind, StatusMessage)> {
        SheetKind::ALL
            .iter()
            .filter_map(|kind| {
                self.session
                    .normalized(*kind)
                    .diagnostic
                    .clone()
                    .map(|d| (*kind, d))
            })
            .collect()
    }

    /// 清洗表前 N 行
    pub fn preview(&mut self, kind: SheetKind) -> SheetPreview {
        let outcome = self.session.normalized(kind);
        let table = outcome.table.head(self.preview_rows());
        let diagnostic = match (&outcome.diagnostic, outcome.table.is_empty()) {
            (Some(d), _) => Some(d.clone()),
            (None, true) => Some(self.unavailable_warning(kind)),
            (None, false) => None,
        };

        SheetPreview {
            kind,
            sheet: self.sheet_name(kind),
            table,
            diagnostic,
        }
    }

    // ==========================================
    // 汇率与换算
    // ==========================================

    pub fn fx_pairs(&mut self, source: FxSource) -> Vec<String> {
        let table = self.table(source.sheet_kind());
        self.fx.fx_pairs(&table)
    }

    /// 某货币对的历史汇率（日期升序）
    pub fn fx_history(&mut self, source: FxSource, pair: &str) -> FxHistoryView {
        let table = self.table(source.sheet_kind());
        let points: Vec<FxHistoryPoint> = self
            .fx
            .fx_history(&table, pair)
            .into_iter()
            .map(|q| FxHistoryPoint {
                date: q.value_date.date(),
                rate: q.rate,
            })
            .collect();

        let diagnostic = if table.is_empty() {
            Some(self.unavailable_warning(source.sheet_kind()))
        } else if points.is_empty() {
            Some(StatusMessage::warning("No valid data for plotting the selected FX pair."))
        } else {
            None
        };

        FxHistoryView {
            source,
            pair: pair.to_string(),
            points,
            diagnostic,
        }
    }

    #[instrument(skip(self, amount))]
    pub fn convert<A: AmountInput>(&mut self, source: FxSource, pair: &str, amount: A) -> ConversionView {
        let table = self.table(source.sheet_kind());
        self.convert_on(source, &table, pair, amount)
    }

    fn convert_on<A: AmountInput>(
        &self,
        source: FxSource,
        table: &NormalizedTable,
        pair: &str,
        amount: A,
    ) -> ConversionView {
        match self.fx.perform_currency_conversion(table, pair, amount) {
            Ok(result) => ConversionView {
                source,
                pair: pair.to_string(),
                converted: Some(result.converted),
                rate: Some(result.rate),
                value_date: Some(result.value_date),
                status: StatusMessage::success(result.message()),
            },
            Err(e) => ConversionView {
                source,
                pair: pair.to_string(),
                converted: None,
                rate: None,
                value_date: None,
                status: StatusMessage::warning(e.to_string()),
            },
        }
    }

    // ==========================================
    // Costing Beans
    // ==========================================

    /// Costing Beans 日期范围（全表最小/最大日期）
    pub fn beans_date_bounds(&mut self) -> Option<(NaiveDate, NaiveDate)> {
        let table = self.table(SheetKind::CostingBeans);
        let dates: Vec<NaiveDate> = table
            .column_values(columns::VALUE_DATE)
            .into_iter()
            .filter_map(|v| recoerce_date(v).map(|d| d.date()))
            .collect();

        let min = dates.iter().min()?;
        let max = dates.iter().max()?;
        Some((*min, *max))
    }

    /// 按货币对与闭区间日期筛选,再在筛选结果上换算
    ///
    /// 未给出的起止日期取全表最小/最大日期。
    /// 比较只看 VALUE DATE 的日历日: `end` 当天任何时刻的行都会保留,
    /// 不是截止到 `end` 零点。
    pub fn beans<A: AmountInput>(
        &mut self,
        pair: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        amount: Option<A>,
    ) -> ApiResult<BeansView> {
        if pair.trim().is_empty() {
            return Err(ApiError::InvalidInput("FX pair must not be empty".to_string()));
        }

        let bounds = self.beans_date_bounds();
        let start = start.or(bounds.map(|b| b.0));
        let end = end.or(bounds.map(|b| b.1));

        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(ApiError::InvalidDateRange {
                    start: s.to_string(),
                    end: e.to_string(),
                });
            }
        }

        let table = self.table(SheetKind::CostingBeans);
        let pair_col = table.column_index(columns::FX_PAIR);
        let date_col = table.column_index(columns::VALUE_DATE);

        let filtered = match (pair_col, date_col) {
            (Some(pc), Some(dc)) => table.filter_rows(|row| {
                // 去掉时刻,按整日比较
                let date = recoerce_date(&row[dc]).map(|d| d.date());
                row[pc].to_string() == pair
                    && match date {
                        Some(d) => start.map_or(true, |s| d >= s) && end.map_or(true, |e| d <= e),
                        None => false,
                    }
            }),
            _ => NormalizedTable::with_columns(table.columns().to_vec()),
        };

        info!(pair, rows = filtered.height(), "Costing Beans 筛选完成");

        let conversion = amount.map(|a| self.convert_on(FxSource::Beans, &filtered, pair, a));

        Ok(BeansView {
            pair: pair.to_string(),
            start,
            end,
            rows: filtered,
            conversion,
        })
    }

    // ==========================================
    // 运费
    // ==========================================

    pub fn freight_options(&mut self) -> FreightOptions {
        let table = self.table(SheetKind::Freight);
        FreightOptions {
            origins: table.distinct_values(columns::ORIGIN),
            destinations: table.distinct_values(columns::DESTINATION),
        }
    }

    #[instrument(skip(self))]
    pub fn freight_quote(&mut self, origin: &str, destination: &str, quantity: f64) -> FreightView {
        let table = self.table(SheetKind::Freight);
        match self
            .freight
            .calculate_freight_cost(&table, origin, destination, quantity)
        {
            Ok(quote) => FreightView {
                origin: origin.to_string(),
                destination: destination.to_string(),
                quantity,
                total_cost: Some(quote.total_cost),
                rate: Some(quote.rate_used),
                status: StatusMessage::info(quote.message()),
            },
            Err(e) => FreightView {
                origin: origin.to_string(),
                destination: destination.to_string(),
                quantity,
                total_cost: None,
                rate: None,
                status: StatusMessage::warning(e.to_string()),
            },
        }
    }

    // ==========================================
    // 估值
    // ==========================================

    #[instrument(skip(self))]
    pub fn valuation(&mut self, buying_diff: f64, costing: f64) -> ValuationView {
        let table = self.table(SheetKind::Valuation);
        match self.valuation.calculate_valuation(&table, buying_diff, costing) {
            Ok(result) => ValuationView {
                buying_diff,
                costing,
                break_even: Some(result.break_even),
                margin: Some(result.margin),
                status: StatusMessage::info(result.message()),
            },
            Err(e) => ValuationView {
                buying_diff,
                costing,
                break_even: None,
                margin: None,
                status: StatusMessage::warning(e.to_string()),
            },
        }
    }

    // ==========================================
    // 产品成本（占位）
    // ==========================================

    pub fn products(&mut self, params: &ProductCostingParams) -> ProductCostingReport {
        let table = self.table(SheetKind::CostingProducts);
        let preview_rows = self.preview_rows();
        self.products
            .calculate_costing_products(&table, params, preview_rows)
    }

    // ==========================================
    // 其他工作表
    // ==========================================

    /// 原始表预览与列概况: Costing Products / Valo / FX Fix / FX Live
    pub fn other_sheets_info(&mut self) -> Vec<SheetInfoView> {
        [
            SheetKind::CostingProducts,
            SheetKind::Valuation,
            SheetKind::FxFix,
            SheetKind::FxLive,
        ]
        .iter()
        .map(|kind| self.sheet_info(*kind))
        .collect()
    }

    pub fn sheet_info(&mut self, kind: SheetKind) -> SheetInfoView {
        let sheet = self.sheet_name(kind);
        let raw = self.session.raw_table(kind);

        if raw.is_empty() {
            return SheetInfoView {
                sheet: sheet.clone(),
                loaded: false,
                rows: 0,
                preview: String::new(),
                columns: Vec::new(),
                warning: Some(StatusMessage::warning(format!("Could not load '{}' data.", sheet))),
            };
        }

        SheetInfoView {
            sheet,
            loaded: true,
            rows: raw.height(),
            preview: render_raw_preview(&raw, self.preview_rows()),
            columns: column_info(&raw),
            warning: None,
        }
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 清洗表导出为 CSV,返回导出行数
    pub fn export_csv<W: Write>(&mut self, kind: SheetKind, writer: W) -> ApiResult<usize> {
        let table = self.table(kind);
        table.write_csv(writer).map_err(|source| ApiError::Export {
            sheet: self.sheet_name(kind),
            source,
        })?;
        Ok(table.height())
    }
}
