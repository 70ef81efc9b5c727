// ==========================================
// 可可贸易测算台 - 表格模型
// ==========================================
// RawTable: 工作表原样读出（首行为表头）
// NormalizedTable: 按固定 schema 投影并完成类型转换
// 两者会话内只读,测算函数不得原地修改
// ==========================================

use crate::domain::types::{format_datetime, CellValue, ColumnType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Write;

static EMPTY_CELL: CellValue = CellValue::Empty;
static MISSING_VALUE: TypedValue = TypedValue::Missing;

// ==========================================
// RawTable - 原始表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// 直接构造,表头与各行补齐到最宽一行
    ///
    /// 超出表头的列命名为 `Unnamed: <列号>`,与 `from_grid` 一致
    pub fn new(mut headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows
            .iter()
            .map(|r| r.len())
            .max()
            .unwrap_or(0)
            .max(headers.len());
        for idx in headers.len()..width {
            headers.push(format!("Unnamed: {}", idx));
        }

        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, CellValue::Empty);
                }
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// 失败占位: 无表头无数据
    pub fn empty() -> Self {
        Self::default()
    }

    /// 由单元格网格构造,首行作为表头
    ///
    /// - 表头去首尾空白
    /// - 空表头命名为 `Unnamed: <列号>`
    /// - 重名表头追加 `.1`、`.2` 后缀
    /// - 跳过完全空白的数据行
    pub fn from_grid(grid: Vec<Vec<CellValue>>) -> Self {
        let width = grid.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut grid_rows = grid.into_iter();

        let header_cells = match grid_rows.next() {
            Some(row) => row,
            None => return Self::empty(),
        };

        let mut padded_header = header_cells;
        padded_header.resize(width, CellValue::Empty);
        let headers = clean_headers(&padded_header);

        let rows = grid_rows
            .filter(|row| !row.iter().all(|c| c.is_empty()))
            .collect();

        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// 无列或无行
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// 越界返回空单元格
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// 前 n 行
    pub fn head(&self, n: usize) -> RawTable {
        RawTable {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

/// 表头清洗（空名补位 + 去重）
fn clean_headers(cells: &[CellValue]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::with_capacity(cells.len());

    for (idx, cell) in cells.iter().enumerate() {
        let text = cell.to_string().trim().to_string();
        let base = if text.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            text
        };

        let mut name = base.clone();
        while seen.contains(&name) {
            let counter = counters.entry(base.clone()).or_insert(0);
            *counter += 1;
            name = format!("{}.{}", base, counter);
        }

        seen.insert(name.clone());
        headers.push(name);
    }

    headers
}

// ==========================================
// TypedValue - 清洗后的单元格
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TypedValue {
    Missing,
    Text(String),
    Decimal(f64),
    Date(NaiveDateTime),
}

impl TypedValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, TypedValue::Missing)
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            TypedValue::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            TypedValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Missing => write!(f, "NaN"),
            TypedValue::Text(s) => write!(f, "{}", s),
            TypedValue::Decimal(v) => write!(f, "{}", v),
            TypedValue::Date(d) => write!(f, "{}", format_datetime(d)),
        }
    }
}

// ==========================================
// NormalizedTable - 清洗后的表
// ==========================================
// 零列 = “不可用”（规范空表）；有列零行 = “无数据”
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedColumn {
    pub name: String,
    pub column_type: ColumnType,
}

impl NormalizedColumn {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self { name: name.into(), column_type }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    columns: Vec<NormalizedColumn>,
    rows: Vec<Vec<TypedValue>>,
}

impl NormalizedTable {
    pub fn new(columns: Vec<NormalizedColumn>, rows: Vec<Vec<TypedValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, TypedValue::Missing);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// 规范空表（不可用）
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// 保留列定义、零行
    pub fn with_columns(columns: Vec<NormalizedColumn>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn columns(&self) -> &[NormalizedColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Vec<TypedValue>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_unavailable(&self) -> bool {
        self.columns.is_empty()
    }

    /// 无列或无行
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.column_index(n).is_some())
    }

    /// 按列名取值,列不存在或越界返回 Missing
    pub fn value(&self, row: usize, column: &str) -> &TypedValue {
        match self.column_index(column) {
            Some(col) => self
                .rows
                .get(row)
                .and_then(|r| r.get(col))
                .unwrap_or(&MISSING_VALUE),
            None => &MISSING_VALUE,
        }
    }

    /// 某列的全部取值（按行序）
    pub fn column_values<'a>(&'a self, column: &str) -> Vec<&'a TypedValue> {
        match self.column_index(column) {
            Some(col) => self.rows.iter().map(|r| &r[col]).collect(),
            None => Vec::new(),
        }
    }

    /// 某列去重后的非空取值（保持首次出现顺序）
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.column_values(column)
            .into_iter()
            .filter(|v| !v.is_missing())
            .map(|v| v.to_string())
            .filter(|s| !s.trim().is_empty() && seen.insert(s.clone()))
            .collect()
    }

    /// 按行过滤,列定义不变
    pub fn filter_rows<F>(&self, mut predicate: F) -> NormalizedTable
    where
        F: FnMut(&[TypedValue]) -> bool,
    {
        NormalizedTable {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| predicate(r.as_slice()))
                .cloned()
                .collect(),
        }
    }

    /// 前 n 行
    pub fn head(&self, n: usize) -> NormalizedTable {
        NormalizedTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// 导出为 CSV（表头 + 数据行,缺失值写空串）
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(self.columns.iter().map(|c| c.name.as_str()))?;

        for row in &self.rows {
            csv_writer.write_record(row.iter().map(|v| match v {
                TypedValue::Missing => String::new(),
                other => other.to_string(),
            }))?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_from_grid_header_cleanup() {
        let grid = vec![
            vec![text(" FX "), text("VALUE DATE"), CellValue::Empty, text("FX"), CellValue::Empty],
            vec![text("EURUSD"), CellValue::Number(45000.0), CellValue::Empty, text("x"), CellValue::Number(1.0)],
        ];

        let table = RawTable::from_grid(grid);
        assert_eq!(
            table.headers(),
            &["FX", "VALUE DATE", "Unnamed: 2", "FX.1", "Unnamed: 4"]
        );
        assert_eq!(table.height(), 1);
    }

    #[test]
    fn test_from_grid_skip_blank_rows() {
        let grid = vec![
            vec![text("Origin"), text("Destination")],
            vec![text("Ghana"), text("Amsterdam")],
            vec![CellValue::Empty, text("  ")],
            vec![text("Ivory Coast"), text("Hamburg")],
        ];

        let table = RawTable::from_grid(grid);
        assert_eq!(table.height(), 2);
        assert_eq!(table.cell(1, 0), &text("Ivory Coast"));
        assert_eq!(table.cell(9, 9), &CellValue::Empty);
    }

    #[test]
    fn test_new_widens_header_to_longest_row() {
        let table = RawTable::new(
            vec!["Quote Table".to_string(), "Last".to_string()],
            vec![
                vec![text("EURUSD"), CellValue::Number(1.1), text("extra")],
                vec![text("GBPUSD")],
            ],
        );

        assert_eq!(table.headers(), &["Quote Table", "Last", "Unnamed: 2"]);
        assert!(table.rows().iter().all(|r| r.len() == table.width()));
        assert_eq!(table.cell(0, 2), &text("extra"));
        assert_eq!(table.cell(1, 1), &CellValue::Empty);
    }

    #[test]
    fn test_from_grid_empty() {
        let table = RawTable::from_grid(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.width(), 0);
    }

    #[test]
    fn test_normalized_unavailable_vs_no_rows() {
        let unavailable = NormalizedTable::unavailable();
        assert!(unavailable.is_unavailable());
        assert!(unavailable.is_empty());

        let no_rows = NormalizedTable::with_columns(vec![NormalizedColumn::new("FX", ColumnType::Text)]);
        assert!(!no_rows.is_unavailable());
        assert!(no_rows.is_empty());
    }

    #[test]
    fn test_distinct_values_keeps_first_seen_order() {
        let table = NormalizedTable::new(
            vec![NormalizedColumn::new("FX", ColumnType::Text)],
            vec![
                vec![TypedValue::Text("GBPUSD".to_string())],
                vec![TypedValue::Text("EURUSD".to_string())],
                vec![TypedValue::Missing],
                vec![TypedValue::Text("GBPUSD".to_string())],
            ],
        );

        assert_eq!(table.distinct_values("FX"), vec!["GBPUSD", "EURUSD"]);
    }

    #[test]
    fn test_write_csv() {
        let table = NormalizedTable::new(
            vec![
                NormalizedColumn::new("Origin", ColumnType::Text),
                NormalizedColumn::new("FreightCost", ColumnType::Decimal),
            ],
            vec![
                vec![TypedValue::Text("Ghana".to_string()), TypedValue::Decimal(45.5)],
                vec![TypedValue::Text("Ivory Coast".to_string()), TypedValue::Missing],
            ],
        );

        let mut buffer = Vec::new();
        table.write_csv(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert_eq!(output, "Origin,FreightCost\nGhana,45.5\nIvory Coast,\n");
    }
}
