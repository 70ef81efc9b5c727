// ==========================================
// 可可贸易测算台 - 配置层
// ==========================================
// 职责: 测算台配置加载,支持多级覆写
// 存储: JSON 文件 + 环境变量
// ==========================================

pub mod desk_config;

pub use desk_config::{ConfigError, DeskConfig, SheetNames};
