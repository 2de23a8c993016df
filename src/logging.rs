//! Logger set-up for the runner binary and for tests.
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// `verbose` lowers the default filter to `debug`; otherwise only `info` and
/// above are shown. `RUST_LOG` always wins over the default.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    install(Builder::from_env(
        Env::default().default_filter_or(level.to_string()),
    ));
}

/// Initializes a logger that writes through the test harness capture.
pub fn init_for_tests() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("debug"));
    builder.is_test(true);
    install(builder);
}

fn install(mut builder: Builder) {
    // `try_init` only fails once a logger is set, which repeated calls from
    // tests trigger on purpose.
    if builder.try_init().is_err() {
        log::trace!("logger already initialised");
    }
}
