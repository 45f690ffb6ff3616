use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins; otherwise only this crate logs, at debug when verbose.
fn crate_filter(verbose: bool) -> EnvFilter {
    let default_directive = if verbose {
        "foundation_contributions=debug"
    } else {
        "foundation_contributions=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// 終端機輸出；verbose 時附上模組與行號，方便追查是哪張訂單出問題
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(crate_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .with_line_number(verbose)
                .with_file(false)
                .without_time()
                .compact(),
        )
        .init();
}

/// 結構化 JSON 日誌，給排程或收集器使用
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(crate_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}
