// ==========================================
// 可可贸易测算台 - 会话内缓存
// ==========================================
// 键: 输入内容的 SHA-256 摘要
// - 加载: 工作簿路径 + 表名列表
// - 清洗: 工作表种类 + 原始表内容
// 失效: 无 TTL,仅在会话重建或工作簿路径变化时整体清空
// ==========================================

use crate::domain::table::RawTable;
use crate::domain::types::SheetKind;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// 字段分隔符,避免拼接歧义
const SEP: &[u8] = &[0x1f];

/// 加载缓存键
pub fn load_key(path: &Path, sheet_names: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    for name in sheet_names {
        hasher.update(SEP);
        hasher.update(name.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// 清洗缓存键（按内容,不按来源）
pub fn normalize_key(kind: SheetKind, raw: &RawTable) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{:?}", kind).as_bytes());

    hasher.update(SEP);
    for header in raw.headers() {
        hasher.update(header.as_bytes());
        hasher.update(SEP);
    }

    for row in raw.rows() {
        hasher.update(b"\n");
        for cell in row {
            hasher.update(cell.type_name().as_bytes());
            hasher.update(b":");
            hasher.update(cell.to_string().as_bytes());
            hasher.update(SEP);
        }
    }

    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// 记忆化表
#[derive(Debug)]
pub struct MemoCache<V> {
    name: &'static str,
    entries: HashMap<String, V>,
    hits: u64,
    misses: u64,
}

impl<V: Clone> MemoCache<V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// 命中直接返回,否则计算并写入
    pub fn get_or_insert_with<F>(&mut self, key: String, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            debug!(cache = self.name, key = %short(&key), "cache hit");
            return value.clone();
        }

        self.misses += 1;
        debug!(cache = self.name, key = %short(&key), "cache miss");
        let value = compute();
        self.entries.insert(key, value.clone());
        value
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn invalidate_all(&mut self) {
        if !self.entries.is_empty() {
            debug!(cache = self.name, dropped = self.entries.len(), "cache invalidated");
        }
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

fn short(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}
