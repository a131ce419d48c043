use log::{info, log_enabled, Level};

/// Initializes the logger with the `env_logger` crate.
///
/// Verbosity follows `RUST_LOG`; per-byte air traffic is logged at `trace`
/// under the `rfa1_radio::radio` target.
pub fn init_logger() {
    env_logger::init();
}

/// Initializes logging for a simulation run with a default filter.
///
/// `RUST_LOG` still takes precedence when it is set.
///
/// # Examples
/// ```rust,no_run
/// use rfa1_radio::logging::init_logger_with_level;
///
/// init_logger_with_level("info");
/// log::info!("Simulation started");
/// ```
pub fn init_logger_with_level(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    // A second initialisation (tests, repeated CLI runs in-process) is harmless.
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}
