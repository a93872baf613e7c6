//! Job execution for the CLI binaries

use crate::cli::args::{JobArgs, JobKind};
use crate::config::RunnerConfig;
use crate::engine::{Counter, JobReport, LocalRunner};
use crate::jobs::{std_subscribers, unique_listeners};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Load configuration, run the job and write the optional JSON report.
pub async fn execute_job(kind: JobKind, args: &JobArgs) -> Result<JobReport> {
    let mut config = RunnerConfig::load(args.config.as_deref()).await?;
    args.apply_overrides(&mut config);
    config.validate()?;
    debug!("Runner configuration: {:?}", config);

    let runner = LocalRunner::new(config);
    let report = match kind {
        JobKind::StdSubscribers => {
            runner
                .run(&std_subscribers::job(), &args.input, &args.output)
                .await?
        }
        JobKind::UniqueListeners => {
            let job = unique_listeners::job(runner.config().play_events);
            runner.run(&job, &args.input, &args.output).await?
        }
    };

    log_counters(&report);

    if let Some(path) = &args.report {
        write_report(path, &report).await?;
    }

    Ok(report)
}

/// Record-quality counters are logged at info, framework counters at debug.
fn log_counters(report: &JobReport) {
    info!("Counters for '{}':", report.job_name);
    for counter in Counter::ALL {
        let value = report.counters.get(counter);
        if counter.is_job_counter() {
            info!("  {}={}", counter, value);
        } else {
            debug!("  {}={}", counter, value);
        }
    }
}

async fn write_report(path: &Path, report: &JobReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write job report to {}", path.display()))?;
    debug!("Wrote job report to {}", path.display());
    Ok(())
}

/// Lines printed on stdout once a job succeeds.
pub fn summary_lines(kind: JobKind, report: &JobReport) -> Vec<String> {
    let invalid = report.counters.get(Counter::InvalidRecordCount);
    match kind {
        JobKind::StdSubscribers => vec![
            format!("No. of Invalid Records :{}", invalid),
            format!(
                "No. of Malformed Timestamps :{}",
                report.counters.get(Counter::MalformedTimestampCount)
            ),
        ],
        JobKind::UniqueListeners => vec![format!("No. of Invalid Records :{}", invalid)],
    }
}
