//! `env_logger` setup and the crate's gated logging macros.
//!
//! Each macro expands to a check of an `ENABLE_LOGS` const that must be in
//! scope at the call site, so a module can silence itself with one flag:
//!
//! ```rust,ignore
//! const ENABLE_LOGS: bool = false;
//! log_info!("suppressed while ENABLE_LOGS is false");
//! ```

use log::LevelFilter;

/// Install `env_logger` with `level` as the fallback filter.
///
/// Directives in `RUST_LOG` override it. Only the first call installs a logger.
pub fn init_logging(level: LevelFilter) {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

#[doc(hidden)]
#[macro_export]
macro_rules! __gated_log {
    ($level:ident, $($arg:tt)*) => {
        if ENABLE_LOGS {
            ::log::$level!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::__gated_log!(debug, $($arg)*) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::__gated_log!(info, $($arg)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::__gated_log!(warn, $($arg)*) };
}

/// Catch-and-log paths (catalog load, completion save) report through this,
/// so modules on those paths keep `ENABLE_LOGS` on.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::__gated_log!(error, $($arg)*) };
}
