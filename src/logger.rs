//! Logging setup for the cascade binary.

/// Initializes the global logger.
///
/// Warnings are always shown since per-file build problems are reported as
/// warnings; `verbose` adds the debug trace of every directory and file.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn })
        .format_timestamp(None)
        .init();
}
