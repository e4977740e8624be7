#![deny(missing_docs)]
//! Logging macros shared by the qrbridge crates.
//!
//! Everything goes through the `log` facade. Per-flow steps (one popup request
//! or one menu click) are logged under [`FLOW_TARGET`] so they can be filtered
//! apart from service lifecycle messages.

use log::LevelFilter;

/// Log target used for per-flow messages (popup requests and menu clicks).
pub const FLOW_TARGET: &str = "qrbridge::flow";

/// Environment variable read by [`initialize_for_tests`] to pick a level.
pub const TEST_LOG_ENV: &str = "QRBRIDGE_TEST_LOG";

/// Logs an info-level message.
#[macro_export]
macro_rules! bridge_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message.
#[macro_export]
macro_rules! bridge_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message.
#[macro_export]
macro_rules! bridge_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message.
#[macro_export]
macro_rules! bridge_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Logs a per-flow step at debug level under [`FLOW_TARGET`].
///
/// The first argument names the flow (menu item id or popup action), the rest
/// is a regular format string.
#[macro_export]
macro_rules! bridge_flow {
    ($flow:expr, $($arg:tt)*) => {{
        log::debug!(target: $crate::FLOW_TARGET, "[{}] {}", $flow, format_args!($($arg)*));
    }};
}

/// Level for the host's `--verbose` switch. Flow steps only show when verbose.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Parse a level name as accepted in [`TEST_LOG_ENV`]. Unknown names yield `None`.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}

/// Installs a stderr logger for tests. No-ops if a logger is already set.
///
/// The level comes from [`TEST_LOG_ENV`] when it names a valid level,
/// otherwise warn, so passing suites stay quiet.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

    let level = std::env::var(TEST_LOG_ENV)
        .ok()
        .and_then(|name| parse_level(&name))
        .unwrap_or(LevelFilter::Warn);
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);
}
