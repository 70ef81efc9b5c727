// ==========================================
// 可可贸易测算台 - 工作表加载器
// ==========================================
// 职责: 按表名列表读取工作簿,每张表得到 RawTable 或失败原因
// 规则:
// - 文件不存在: 当前表记致命错误,其余表不再尝试
// - 其他单表错误: 仅该表失败,继续加载后续表
// - 结果覆盖全部请求的表名,失败表以空表占位
// ==========================================

use crate::domain::table::RawTable;
use crate::domain::types::StatusMessage;
use crate::importer::error::ImportError;
use crate::importer::file_parser::{ExcelWorkbookReader, SheetSource, WorkbookReader};
use crate::perf::PerfGuard;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

// ==========================================
// SheetLoad - 单表加载结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLoad {
    pub sheet: String,
    /// 失败时为空表
    pub table: RawTable,
    pub error: Option<ImportError>,
}

impl SheetLoad {
    fn loaded(sheet: &str, table: RawTable) -> Self {
        Self { sheet: sheet.to_string(), table, error: None }
    }

    fn failed(sheet: &str, error: ImportError) -> Self {
        Self { sheet: sheet.to_string(), table: RawTable::empty(), error: Some(error) }
    }

    pub fn is_loaded(&self) -> bool {
        self.error.is_none()
    }

    /// 侧栏状态消息
    pub fn status(&self) -> StatusMessage {
        match &self.error {
            None => StatusMessage::success(format!("Successfully loaded sheet: '{}'", self.sheet)),
            Some(e @ ImportError::FileNotFound(_)) => StatusMessage::error(format!("Error: {}", e)),
            Some(e) => StatusMessage::error(format!("Error loading sheet '{}': {}", self.sheet, e)),
        }
    }
}

// ==========================================
// LoadReport - 整本加载结果（按请求顺序）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub path: PathBuf,
    pub sheets: Vec<SheetLoad>,
}

impl LoadReport {
    pub fn get(&self, sheet: &str) -> Option<&SheetLoad> {
        self.sheets.iter().find(|s| s.sheet == sheet)
    }

    pub fn table(&self, sheet: &str) -> Option<&RawTable> {
        self.get(sheet).map(|s| &s.table)
    }

    pub fn statuses(&self) -> Vec<StatusMessage> {
        self.sheets.iter().map(SheetLoad::status).collect()
    }

    pub fn loaded_count(&self) -> usize {
        self.sheets.iter().filter(|s| s.is_loaded()).count()
    }

    /// 工作簿文件是否缺失
    pub fn file_missing(&self) -> bool {
        self.sheets
            .iter()
            .any(|s| matches!(s.error, Some(ImportError::FileNotFound(_))))
    }
}

// ==========================================
// SheetLoader
// ==========================================
pub struct SheetLoader<R: WorkbookReader = ExcelWorkbookReader> {
    reader: R,
}

impl SheetLoader<ExcelWorkbookReader> {
    pub fn new() -> Self {
        Self { reader: ExcelWorkbookReader }
    }
}

impl Default for SheetLoader<ExcelWorkbookReader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: WorkbookReader> SheetLoader<R> {
    pub fn with_reader(reader: R) -> Self {
        Self { reader }
    }

    /// 加载请求的工作表（重复表名只保留首个）
    pub fn load(&self, path: &Path, sheet_names: &[String]) -> LoadReport {
        let mut perf = PerfGuard::new("load_workbook").with_detail(path.display().to_string());

        let mut requested: Vec<&str> = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            if !requested.contains(&name.as_str()) {
                requested.push(name.as_str());
            }
        }

        let sheets = match self.reader.open(path) {
            Ok(mut source) => read_all(source.as_mut(), &requested),
            Err(e) => fail_all(&requested, e),
        };

        let report = LoadReport { path: path.to_path_buf(), sheets };
        perf.set_rows(report.sheets.iter().map(|s| s.table.height()).sum());

        info!(
            path = %path.display(),
            requested = requested.len(),
            loaded = report.loaded_count(),
            "工作簿加载完成"
        );
        report
    }
}

fn read_all(source: &mut dyn SheetSource, requested: &[&str]) -> Vec<SheetLoad> {
    let mut results = Vec::with_capacity(requested.len());

    for sheet in requested {
        match source.read_sheet(sheet) {
            Ok(table) => {
                info!(sheet = %sheet, rows = table.height(), cols = table.width(), "Successfully loaded sheet");
                results.push(SheetLoad::loaded(sheet, table));
            }
            Err(e) => {
                warn!(sheet = %sheet, error = %e, "工作表加载失败,继续后续工作表");
                results.push(SheetLoad::failed(sheet, e));
            }
        }
    }

    results
}

/// 工作簿无法打开: 文件缺失时首表记致命错误、其余记中止；其他原因每张表同记该错误
fn fail_all(requested: &[&str], open_error: ImportError) -> Vec<SheetLoad> {
    if open_error.is_fatal() {
        error!(error = %open_error, "工作簿文件不存在,中止加载");
    } else {
        error!(error = %open_error, "工作簿无法打开");
    }

    requested
        .iter()
        .enumerate()
        .map(|(idx, sheet)| {
            let err = if open_error.is_fatal() && idx > 0 {
                ImportError::LoadAborted(sheet.to_string())
            } else {
                open_error.clone()
            };
            SheetLoad::failed(sheet, err)
        })
        .collect()
}
