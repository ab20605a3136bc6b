//! Logger bootstrap

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Filter used when `RUST_LOG` is unset. Dependencies stay at info; only the
/// sim's own per-tick traces follow `verbose`.
pub fn default_filter(verbose: bool) -> String {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    format!("info,{}={level}", env!("CARGO_CRATE_NAME"))
}

/// Install the global logger. `RUST_LOG` still wins over `verbose`.
pub fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose));
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis();

    // A second init (tests, embedding hosts) keeps the first logger
    if builder.try_init().is_ok() {
        log::debug!("Logger installed with {}", default_filter(verbose));
    }
}
