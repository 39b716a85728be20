use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle, opt_format};
use std::env;

pub const LOG_ENV: &str = "CHESS_LOG";
const DEFAULT_LEVEL: &str = "error";

/// Maps the `CHESS_LOG` value to a log spec; unknown values fall back to `error`.
fn level_spec(raw: Option<&str>) -> &'static str {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("error" | "err") => "error",
        Some("warn" | "warning") => "warn",
        Some("info") => "info",
        Some("debug") => "debug",
        Some("trace") => "trace",
        _ => DEFAULT_LEVEL,
    }
}

/// Starts a stderr logger at the level named by `CHESS_LOG`.
///
/// Keep the returned handle alive for as long as logging is needed.
pub fn init_logging() -> Result<LoggerHandle, FlexiLoggerError> {
    let raw = env::var(LOG_ENV).ok();
    Logger::try_with_str(level_spec(raw.as_deref()))?
        .format(opt_format)
        .log_to_stderr()
        .start()
}
