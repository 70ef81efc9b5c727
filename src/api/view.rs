// ==========================================
// 可可贸易测算台 - 展示辅助
// ==========================================
// 职责: 数值格式化、表格文本预览、列概况
// 格式: 金额 2 位小数,汇率 4 位小数,日期 %Y-%m-%d
// ==========================================

use crate::domain::table::{NormalizedTable, RawTable};
use crate::domain::types::CellValue;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn format_rate(value: f64) -> String {
    format!("{:.4}", value)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ==========================================
// 文本表格
// ==========================================

/// 渲染带行号的右对齐文本表
pub fn render_text_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return "(no columns)".to_string();
    }

    let index_width = rows.len().saturating_sub(1).to_string().len();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .filter_map(|r| r.get(col))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);

    let mut header_line = " ".repeat(index_width);
    for (header, width) in headers.iter().zip(&widths) {
        header_line.push_str("  ");
        header_line.push_str(&pad_left(header, *width));
    }
    lines.push(header_line);

    for (idx, row) in rows.iter().enumerate() {
        let mut line = pad_right(&idx.to_string(), index_width);
        for (col, width) in widths.iter().enumerate() {
            let cell = row.get(col).map(String::as_str).unwrap_or("");
            line.push_str("  ");
            line.push_str(&pad_left(cell, *width));
        }
        lines.push(line);
    }

    if rows.is_empty() {
        lines.push("(no rows)".to_string());
    }

    lines.join("\n")
}

fn pad_left(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", " ".repeat(width.saturating_sub(len)), text)
}

fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

/// 原始表前 n 行（空单元格显示为 NaN）
pub fn render_raw_preview(table: &RawTable, n: usize) -> String {
    let head = table.head(n);
    let rows: Vec<Vec<String>> = head
        .rows()
        .iter()
        .map(|row| row.iter().map(raw_cell_text).collect())
        .collect();
    render_text_table(head.headers(), &rows)
}

/// 清洗表前 n 行
pub fn render_normalized_preview(table: &NormalizedTable, n: usize) -> String {
    let head = table.head(n);
    let headers: Vec<String> = head.column_names().iter().map(|s| s.to_string()).collect();
    let rows: Vec<Vec<String>> = head
        .rows()
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();
    render_text_table(&headers, &rows)
}

fn raw_cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => "NaN".to_string(),
        other => other.to_string(),
    }
}

// ==========================================
// 列概况
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub non_empty: usize,
    /// 非空单元格的类型；多种类型并存时为 mixed
    pub inferred_type: String,
}

pub fn column_info(table: &RawTable) -> Vec<ColumnInfo> {
    table
        .headers()
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let mut types = BTreeSet::new();
            let mut non_empty = 0usize;
            for row in 0..table.height() {
                let cell = table.cell(row, col);
                if !cell.is_empty() {
                    non_empty += 1;
                    types.insert(cell.type_name());
                }
            }

            let inferred_type = match types.len() {
                0 => "empty".to_string(),
                1 => types.iter().next().map(|t| t.to_string()).unwrap_or_default(),
                _ => "mixed".to_string(),
            };

            ColumnInfo {
                name: name.clone(),
                non_empty,
                inferred_type,
            }
        })
        .collect()
}

/// 列概况文本
pub fn render_column_info(entries: usize, columns: &[ColumnInfo]) -> String {
    let headers = vec![
        "Column".to_string(),
        "Non-Null Count".to_string(),
        "Type".to_string(),
    ];
    let rows: Vec<Vec<String>> = columns
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                format!("{} non-null", c.non_empty),
                c.inferred_type.clone(),
            ]
        })
        .collect();

    format!(
        "RangeIndex: {} entries\n{}",
        entries,
        render_text_table(&headers, &rows)
    )
}
