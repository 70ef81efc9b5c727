// ==========================================
// 可可贸易测算台 - 日志初始化
// ==========================================
// 输出: stderr（stdout 留给命令结果与 `--json`）
// 过滤: RUST_LOG 优先,否则取调用方给的默认级别
//
// 主要事件与字段:
// - cocoa_trading_desk::importer::sheet_loader  sheet / rows / cols / error
// - cocoa_trading_desk::importer::normalizer    sheet / message（清洗诊断）, kept / dropped
// - cocoa_trading_desk::app::cache              cache(load|normalize) / key（命中、未命中、失效）
// - cocoa_trading_desk::api::dashboard_api      pair / rows（Beans 筛选）
// - cocoa_trading_desk::engine::*               各测算的 span 与匹配结果
// - perf                                        op / detail / elapsed_ms / rows（需 COCOA_DESK_PERF）
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// 以 info 级别初始化文本日志
///
/// 只看缓存命中情况: `RUST_LOG=cocoa_trading_desk::app::cache=debug`
///
/// ```no_run
/// use cocoa_trading_desk::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with_default("info");
}

/// 文本日志,带 target 与行号；重复调用无效果
pub fn init_with_default(default_level: &str) {
    let _ = fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .try_init();
}

/// 测试用: debug 级别,输出交给测试框架捕获
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// JSON 行日志（`--log-json`）,字段同文本格式
pub fn init_json() {
    let _ = fmt()
        .json()
        .with_env_filter(env_filter("info"))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}
