// ==========================================
// 可可贸易测算台 - 应用层
// ==========================================
// 职责: 会话上下文与缓存,连接展示层与导入/测算层
// ==========================================

pub mod cache;
pub mod session;

// 重导出
pub use cache::{CacheStats, MemoCache};
pub use session::DeskSession;
