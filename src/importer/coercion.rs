// ==========================================
// 可可贸易测算台 - 类型转换
// ==========================================
// 职责: 单元格 → 字符串 / 数值 / 日期
// 规则: 字符串转换永不失败；数值、日期无法解析时记为缺失
// ==========================================

use crate::domain::table::TypedValue;
use crate::domain::types::{format_datetime, CellValue, ColumnType};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Excel 序列日期上限（9999-12-31）
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d", "%d-%b-%Y", "%d %b %Y", "%b %d, %Y",
];

/// 按目标列类型转换单元格
pub fn coerce_cell(cell: &CellValue, column_type: ColumnType) -> TypedValue {
    match column_type {
        ColumnType::Text => cell_to_text(cell),
        ColumnType::Decimal => cell_to_decimal(cell),
        ColumnType::Date => cell_to_date(cell),
    }
}

/// 字符串转换（空单元格 → 空串）
pub fn cell_to_text(cell: &CellValue) -> TypedValue {
    TypedValue::Text(cell.to_string())
}

/// 数值转换
pub fn cell_to_decimal(cell: &CellValue) -> TypedValue {
    let value = match cell {
        CellValue::Number(n) => Some(*n),
        CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        CellValue::Text(s) => parse_number_text(s),
        CellValue::Empty | CellValue::DateTime(_) | CellValue::Error(_) => None,
    };
    decimal_or_missing(value)
}

/// 日期转换（数值按 Excel 序列日期解释）
pub fn cell_to_date(cell: &CellValue) -> TypedValue {
    let value = match cell {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Number(n) => excel_serial_to_datetime(*n),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Empty | CellValue::Bool(_) | CellValue::Error(_) => None,
    };
    value.map(TypedValue::Date).unwrap_or(TypedValue::Missing)
}

/// 对已清洗的值重新做数值转换（测算前的二次校验）
pub fn recoerce_decimal(value: &TypedValue) -> Option<f64> {
    match value {
        TypedValue::Decimal(v) if v.is_finite() => Some(*v),
        TypedValue::Text(s) => parse_number_text(s),
        _ => None,
    }
}

/// 对已清洗的值重新做日期转换
pub fn recoerce_date(value: &TypedValue) -> Option<NaiveDateTime> {
    match value {
        TypedValue::Date(d) => Some(*d),
        TypedValue::Decimal(v) => excel_serial_to_datetime(*v),
        TypedValue::Text(s) => parse_date_text(s),
        TypedValue::Missing => None,
    }
}

/// 取字符串形式（缺失值 → None）
pub fn recoerce_text(value: &TypedValue) -> Option<String> {
    match value {
        TypedValue::Missing => None,
        TypedValue::Date(d) => Some(format_datetime(d)),
        other => Some(other.to_string()),
    }
}

/// 解析数值文本（去首尾空白,NaN 视为缺失）
pub fn parse_number_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// 解析日期文本
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Excel 序列日期 → 日期时间（纪元 1899-12-30）
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial >= MAX_EXCEL_SERIAL {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.floor() as i64;
    let seconds = ((serial - serial.floor()) * 86_400.0).round() as i64;

    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

fn decimal_or_missing(value: Option<f64>) -> TypedValue {
    match value {
        Some(v) if !v.is_nan() => TypedValue::Decimal(v),
        _ => TypedValue::Missing,
    }
}
