// ==========================================
// 可可贸易测算台 - 领域类型定义
// ==========================================
// 职责: 单元格值、列类型、工作表种类、状态消息、错误分类
// ==========================================

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 单元格值 (Cell Value)
// ==========================================
// 工作簿读出的原始值,未经类型约束
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl CellValue {
    /// 是否为空单元格
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 推断出的类型名（用于工作表概况）
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Text(_) => "string",
            CellValue::Number(_) => "number",
            CellValue::Bool(_) => "boolean",
            CellValue::DateTime(_) => "date",
            CellValue::Error(_) => "error",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", format_datetime(dt)),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

/// 零点时刻只输出日期部分
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    if dt.time().num_seconds_from_midnight() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

// ==========================================
// 列类型 (Column Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Decimal,
    Date,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Text => write!(f, "string"),
            ColumnType::Decimal => write!(f, "decimal"),
            ColumnType::Date => write!(f, "date"),
        }
    }
}

// ==========================================
// 工作表种类 (Sheet Kind)
// ==========================================
// 每种工作表对应一套清洗规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SheetKind {
    CostingBeans,
    CostingProducts,
    Freight,
    Valuation,
    FxFix,
    FxLive,
}

impl SheetKind {
    /// 加载顺序与原工作簿一致
    pub const ALL: [SheetKind; 6] = [
        SheetKind::CostingBeans,
        SheetKind::CostingProducts,
        SheetKind::Freight,
        SheetKind::Valuation,
        SheetKind::FxFix,
        SheetKind::FxLive,
    ];

    /// 工作簿中的默认表名
    pub fn default_sheet_name(&self) -> &'static str {
        match self {
            SheetKind::CostingBeans => "Costing Beans",
            SheetKind::CostingProducts => "Costing Products",
            SheetKind::Freight => "Freight & Dressing",
            SheetKind::Valuation => "Valo Ori & Dest",
            SheetKind::FxFix => "Market & FX Fix",
            SheetKind::FxLive => "Market & FX Live",
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.default_sheet_name())
    }
}

impl std::str::FromStr for SheetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "beans" | "costing-beans" => Ok(SheetKind::CostingBeans),
            "products" | "costing-products" => Ok(SheetKind::CostingProducts),
            "freight" => Ok(SheetKind::Freight),
            "valuation" | "valo" => Ok(SheetKind::Valuation),
            "fx-fix" | "fix" => Ok(SheetKind::FxFix),
            "fx-live" | "live" => Ok(SheetKind::FxLive),
            other => Err(format!("unknown sheet kind: {}", other)),
        }
    }
}

// ==========================================
// 状态消息 (Status Message)
// ==========================================
// 由展示层转换为成功/警告/错误提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub message: String,
}

impl StatusMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: StatusLevel::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: StatusLevel::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: StatusLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: StatusLevel::Error, message: message.into() }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            StatusLevel::Success => "OK",
            StatusLevel::Info => "INFO",
            StatusLevel::Warning => "WARN",
            StatusLevel::Error => "ERROR",
        };
        write!(f, "[{}] {}", tag, self.message)
    }
}

// ==========================================
// 错误分类 (Error Kind)
// ==========================================
// 各层错误统一映射到此分类,仅首次找不到工作簿文件为致命错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    FileNotFound,
    SheetLoadError,
    SchemaMissing,
    NoMatchFound,
    NonNumericValue,
    InvalidInput,
    NotImplemented,
}
