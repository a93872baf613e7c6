//! Logging configuration and initialization

use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count. `-v` and `-vv` raise only this crate;
/// `-vvv` also traces dependencies such as tokio.
pub fn get_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "mrjobs=debug,info",
        2 => "mrjobs=trace,info",
        _ => "trace",
    }
}

/// Install the global subscriber. Logs go to stderr so stdout only carries job
/// summaries.
///
/// Without `-v`, `RUST_LOG` is honoured when set.
pub fn init_logging(verbose: u8) {
    let filter = if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(get_log_level(0)))
    } else {
        EnvFilter::new(get_log_level(verbose))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("Logging initialized with verbosity level: {}", verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}
