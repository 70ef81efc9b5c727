// ==========================================
// 可可贸易测算台 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::types::ErrorKind;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("File not found at {0}")]
    FileNotFound(String),

    #[error("Unsupported workbook format: '{0}' (expected .xlsx/.xlsm/.xlsb/.xls/.ods)")]
    UnsupportedFormat(String),

    #[error("Failed to open workbook: {0}")]
    WorkbookOpenError(String),

    // ===== 工作表错误 =====
    #[error("Worksheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("Failed to read worksheet: {0}")]
    SheetReadError(String),

    #[error("Sheet '{0}' not loaded: workbook file not found")]
    LoadAborted(String),
}

impl ImportError {
    /// 映射到统一错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::FileNotFound(_) | ImportError::LoadAborted(_) => ErrorKind::FileNotFound,
            _ => ErrorKind::SheetLoadError,
        }
    }

    /// 文件不存在时中止后续工作表加载
    pub fn is_fatal(&self) -> bool {
        matches!(self, ImportError::FileNotFound(_))
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::SheetReadError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
