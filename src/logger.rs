use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别。
/// 未设置时: `--verbose` 为 debug，否则为 info
///
/// 示例:
/// - RUST_LOG=trace httpwatch --watch-file api.http
pub fn init_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));

    // 多次初始化（例如测试中）时忽略错误
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    tracing::debug!("Logger initialized");
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info,httpwatch=debug")
    } else {
        EnvFilter::new("info")
    }
}
