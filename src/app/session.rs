// ==========================================
// 可可贸易测算台 - 会话上下文
// ==========================================
// 职责: 持有配置、加载器、清洗器与两级缓存
// 生命周期: 进程启动时构造一次,按引用传给需要的调用方
// 不变量: 加载结果与清洗结果在会话内只读
// ==========================================

use crate::app::cache::{load_key, normalize_key, CacheStats, MemoCache};
use crate::config::DeskConfig;
use crate::domain::table::RawTable;
use crate::domain::types::SheetKind;
use crate::importer::file_parser::{ExcelWorkbookReader, WorkbookReader};
use crate::importer::normalizer::{ColumnNormalizer, NormalizeOutcome};
use crate::importer::sheet_loader::{LoadReport, SheetLoader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub struct DeskSession<R: WorkbookReader = ExcelWorkbookReader> {
    config: DeskConfig,
    loader: SheetLoader<R>,
    normalizer: ColumnNormalizer,
    load_cache: MemoCache<Arc<LoadReport>>,
    normalize_cache: MemoCache<Arc<NormalizeOutcome>>,
}

impl DeskSession<ExcelWorkbookReader> {
    pub fn new(config: DeskConfig) -> Self {
        Self::with_reader(config, ExcelWorkbookReader)
    }
}

impl<R: WorkbookReader> DeskSession<R> {
    pub fn with_reader(config: DeskConfig, reader: R) -> Self {
        Self {
            config,
            loader: SheetLoader::with_reader(reader),
            normalizer: ColumnNormalizer,
            load_cache: MemoCache::new("load"),
            normalize_cache: MemoCache::new("normalize"),
        }
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// 切换工作簿路径（路径变化时清空全部缓存）
    pub fn set_workbook_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if path != self.config.workbook_path {
            info!(from = %self.config.workbook_path.display(), to = %path.display(), "切换工作簿");
            self.config.workbook_path = path;
            self.invalidate();
        }
    }

    /// 丢弃已加载与已清洗的表
    pub fn invalidate(&mut self) {
        self.load_cache.invalidate_all();
        self.normalize_cache.invalidate_all();
    }

    /// 整本加载结果（按路径 + 表名列表缓存）
    pub fn load_report(&mut self) -> Arc<LoadReport> {
        let path = self.config.workbook_path.clone();
        let sheet_names = self.config.sheets.ordered();
        let key = load_key(&path, &sheet_names);

        let loader = &self.loader;
        self.load_cache
            .get_or_insert_with(key, || Arc::new(loader.load(&path, &sheet_names)))
    }

    /// 某类工作表的原始表（未加载时为空表）
    pub fn raw_table(&mut self, kind: SheetKind) -> RawTable {
        let report = self.load_report();
        report
            .table(self.config.sheets.name_for(kind))
            .cloned()
            .unwrap_or_default()
    }

    /// 某类工作表的清洗结果（按原始表内容缓存）
    pub fn normalized(&mut self, kind: SheetKind) -> Arc<NormalizeOutcome> {
        let report = self.load_report();
        let sheet_name = self.config.sheets.name_for(kind).to_string();
        let empty = RawTable::empty();
        let raw = report.table(&sheet_name).unwrap_or(&empty);

        let key = normalize_key(kind, raw);
        let normalizer = &self.normalizer;
        self.normalize_cache
            .get_or_insert_with(key, || Arc::new(normalizer.normalize(kind, raw)))
    }

    pub fn cache_stats(&self) -> (CacheStats, CacheStats) {
        (self.load_cache.stats(), self.normalize_cache.stats())
    }
}
