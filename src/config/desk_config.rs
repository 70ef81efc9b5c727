// ==========================================
// 可可贸易测算台 - 测算台配置
// ==========================================
// 职责: 工作簿路径、各工作表名、预览行数
// 覆写顺序: 显式配置文件 → 用户配置目录 → 内置默认 → 环境变量 → 命令行
// ==========================================

use crate::domain::types::SheetKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_WORKBOOK_PATH: &str = "./Cocoa Trading Sheet.xlsx";
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

pub const ENV_WORKBOOK: &str = "COCOA_DESK_WORKBOOK";
pub const ENV_PREVIEW_ROWS: &str = "COCOA_DESK_PREVIEW_ROWS";

const CONFIG_DIR_NAME: &str = "cocoa-trading-desk";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },
}

// ==========================================
// SheetNames - 各工作表在工作簿中的名称
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub costing_beans: String,
    pub costing_products: String,
    pub freight: String,
    pub valuation: String,
    pub fx_fix: String,
    pub fx_live: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            costing_beans: SheetKind::CostingBeans.default_sheet_name().to_string(),
            costing_products: SheetKind::CostingProducts.default_sheet_name().to_string(),
            freight: SheetKind::Freight.default_sheet_name().to_string(),
            valuation: SheetKind::Valuation.default_sheet_name().to_string(),
            fx_fix: SheetKind::FxFix.default_sheet_name().to_string(),
            fx_live: SheetKind::FxLive.default_sheet_name().to_string(),
        }
    }
}

impl SheetNames {
    pub fn name_for(&self, kind: SheetKind) -> &str {
        match kind {
            SheetKind::CostingBeans => &self.costing_beans,
            SheetKind::CostingProducts => &self.costing_products,
            SheetKind::Freight => &self.freight,
            SheetKind::Valuation => &self.valuation,
            SheetKind::FxFix => &self.fx_fix,
            SheetKind::FxLive => &self.fx_live,
        }
    }

    /// 按加载顺序列出全部表名
    pub fn ordered(&self) -> Vec<String> {
        SheetKind::ALL
            .iter()
            .map(|kind| self.name_for(*kind).to_string())
            .collect()
    }
}

// ==========================================
// DeskConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub workbook_path: PathBuf,
    pub sheets: SheetNames,
    pub preview_rows: usize,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            workbook_path: PathBuf::from(DEFAULT_WORKBOOK_PATH),
            sheets: SheetNames::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl DeskConfig {
    /// 加载配置并应用环境变量覆写
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.display().to_string()));
                }
                Self::from_file(path)?
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("未找到配置文件,使用内置默认配置");
                    Self::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// 从 JSON 文件读取（缺省字段取默认值）
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config: DeskConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        info!(path = %path.display(), "已加载配置文件");
        Ok(config)
    }

    /// 环境变量覆写（空值忽略）
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_WORKBOOK) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                self.workbook_path = PathBuf::from(trimmed);
            }
        }

        if let Some(value) = lookup(ENV_PREVIEW_ROWS) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                self.preview_rows = trimmed.parse::<usize>().map_err(|_| ConfigError::InvalidEnv {
                    key: ENV_PREVIEW_ROWS,
                    value: value.clone(),
                })?;
            }
        }

        Ok(())
    }
}

/// `<config_dir>/cocoa-trading-desk/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
