//! Logger setup for the `pounce` binary.

use env_logger::Env;

/// Initialize the process-wide logger.
///
/// Verbosity is controlled through `POUNCE_LOG` (standard `env_logger`
/// filter syntax), defaulting to warnings so search output stays clean.
pub fn initialize() {
    env_logger::Builder::from_env(Env::new().filter_or("POUNCE_LOG", "warn"))
        .format_timestamp(None)
        .init();
}
