use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use std::time::Instant;

static PERF_ENABLED: AtomicBool = AtomicBool::new(false);
static PERF_INIT: Once = Once::new();

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// 性能日志开关
///
/// - Debug 默认开启；Release 默认关闭
/// - `COCOA_DESK_PERF=1` 强制开启,`COCOA_DESK_PERF=0` 强制关闭
pub fn perf_enabled() -> bool {
    PERF_INIT.call_once(|| {
        let enabled = match std::env::var("COCOA_DESK_PERF") {
            Ok(v) => is_true(&v),
            Err(_) => cfg!(debug_assertions),
        };
        PERF_ENABLED.store(enabled, Ordering::Relaxed);
    });
    PERF_ENABLED.load(Ordering::Relaxed)
}

/// 性能统计 Guard：记录 elapsed_ms + 处理行数
///
/// 使用方式：
/// ```ignore
/// let mut perf = cocoa_trading_desk::perf::PerfGuard::new("normalize");
/// // do work...
/// perf.set_rows(table.height());
/// ```
pub struct PerfGuard {
    op: &'static str,
    detail: Option<String>,
    start: Instant,
    rows: usize,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            detail: None,
            start: Instant::now(),
            rows: 0,
        }
    }

    /// 附加说明（如工作表名）
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn set_rows(&mut self, rows: usize) {
        self.rows = rows;
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        if !perf_enabled() {
            return;
        }

        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        tracing::info!(
            target: "perf",
            op = self.op,
            detail = self.detail.as_deref().unwrap_or(""),
            elapsed_ms,
            rows = self.rows,
            "done"
        );
    }
}
