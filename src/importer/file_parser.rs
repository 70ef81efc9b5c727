// ==========================================
// 可可贸易测算台 - 工作簿读取器
// ==========================================
// 支持: Excel (.xlsx/.xlsm/.xlsb/.xls) / OpenDocument (.ods)
// 读取方式: calamine 自动识别格式,逐表读出单元格网格
// ==========================================

use crate::domain::table::RawTable;
use crate::domain::types::CellValue;
use crate::importer::coercion::excel_serial_to_datetime;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

// ==========================================
// Trait 定义
// ==========================================

/// 工作簿打开器
///
/// 生产环境使用 calamine,测试中可替换为内存实现
pub trait WorkbookReader {
    fn open(&self, path: &Path) -> ImportResult<Box<dyn SheetSource>>;
}

/// 已打开的工作簿
pub trait SheetSource {
    /// 读取指定工作表（首行为表头）
    fn read_sheet(&mut self, sheet_name: &str) -> ImportResult<RawTable>;
}

// ==========================================
// calamine 实现
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelWorkbookReader;

impl WorkbookReader for ExcelWorkbookReader {
    fn open(&self, path: &Path) -> ImportResult<Box<dyn SheetSource>> {
        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let workbook = open_workbook_auto(path)
            .map_err(|e| ImportError::WorkbookOpenError(e.to_string()))?;

        Ok(Box::new(ExcelSheetSource { workbook }))
    }
}

struct ExcelSheetSource {
    workbook: Sheets<BufReader<File>>,
}

impl SheetSource for ExcelSheetSource {
    fn read_sheet(&mut self, sheet_name: &str) -> ImportResult<RawTable> {
        if !self.workbook.sheet_names().iter().any(|n| n == sheet_name) {
            return Err(ImportError::SheetNotFound(sheet_name.to_string()));
        }

        let range = self.workbook.worksheet_range(sheet_name)?;

        // calamine 的区域从首个非空单元格开始,左侧空列需补齐以保持列号
        let left_pad = range.start().map(|(_, col)| col as usize).unwrap_or(0);

        let grid: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| {
                let mut cells = vec![CellValue::Empty; left_pad];
                cells.extend(row.iter().map(convert_cell));
                cells
            })
            .collect();

        Ok(RawTable::from_grid(grid))
    }
}

/// calamine 单元格 → CellValue
pub fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match excel_serial_to_datetime(dt.as_f64()) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}
