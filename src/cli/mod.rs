//! CLI entry points shared by the job binaries
//!
//! - Argument parsing structures
//! - Logging setup
//! - Job execution and summary output

pub mod args;
pub mod logging;
pub mod router;

pub use args::{JobArgs, JobKind};
pub use logging::{get_log_level, init_logging};
pub use router::{execute_job, summary_lines};

use crate::error::{describe_error_code, MrError};
use tracing::error;

/// Parse arguments, run the job and return the process exit code.
///
/// Usage errors never return: clap prints usage and exits with code 2.
pub async fn run(kind: JobKind) -> i32 {
    let args = JobArgs::parse_for(kind);
    init_logging(args.verbose);

    match execute_job(kind, &args).await {
        Ok(report) => {
            for line in summary_lines(kind, &report) {
                println!("{}", line);
            }
            0
        }
        Err(e) => {
            error!("Job failed: {:#}", e);
            for line in error_lines(&e) {
                eprintln!("{}", line);
            }
            1
        }
    }
}

/// Lines printed on stderr when a job fails.
pub fn error_lines(err: &anyhow::Error) -> Vec<String> {
    match err.downcast_ref::<MrError>() {
        Some(mr_err) => vec![
            format!("Error: {}", mr_err.user_message()),
            format!(
                "  [E{:04}] {}",
                mr_err.code(),
                describe_error_code(mr_err.code())
            ),
        ],
        None => vec![format!("Error: {:#}", err)],
    }
}
