//! In-process job execution
//!
//! The runner reads the input, runs one map task per split on the blocking
//! thread pool (bounded by `max_parallel`), shuffles the map output into
//! sorted partitions and runs one reduce task per partition.

use super::input::{self, InputSplit};
use super::output::OutputCommitter;
use super::shuffle::{self, Partition};
use super::{Combiner, Counter, CounterSnapshot, Counters, Emitter, Job, Mapper, Reducer};
use crate::config::RunnerConfig;
use crate::error::{ErrorCode, MrError, Result};
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Summary of a finished job run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub job_name: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub map_tasks: usize,
    pub reduce_tasks: usize,
    pub output_files: Vec<PathBuf>,
    pub counters: CounterSnapshot,
}

/// Executes jobs on the local machine.
pub struct LocalRunner {
    config: RunnerConfig,
}

impl LocalRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run `job` over `input`, writing sorted part files into `output`.
    ///
    /// The output location is checked before any input is read. `_SUCCESS` is
    /// only written once every partition has been written.
    pub async fn run<M, R>(&self, job: &Job<M, R>, input: &Path, output: &Path) -> Result<JobReport>
    where
        M: Mapper,
        R: Reducer<M::Key, M::Value>,
    {
        let started_at = Utc::now();
        let clock = Instant::now();
        info!(
            "Running job '{}': {} -> {}",
            job.name(),
            input.display(),
            output.display()
        );

        let committer = OutputCommitter::new(output);
        committer.check().await?;

        let files = input::discover_files(input).await?;
        let splits = input::read_splits(&files, self.config.split_lines).await?;
        let map_tasks = splits.len();
        info!(
            "Found {} input file(s) in {} split(s)",
            files.len(),
            map_tasks
        );

        committer.setup().await?;

        let counters = Arc::new(Counters::default());
        let map_outputs = self.run_map_phase(job, splits, &counters).await?;

        let partitions = shuffle::shuffle(map_outputs, self.config.reducers);
        let reduce_tasks = partitions.len();
        let output_files = self
            .run_reduce_phase(job, partitions, &committer, &counters)
            .await?;

        committer.commit().await?;

        let elapsed_ms = clock.elapsed().as_millis() as u64;
        info!("Job '{}' completed in {} ms", job.name(), elapsed_ms);

        Ok(JobReport {
            job_name: job.name().to_string(),
            started_at,
            elapsed_ms,
            map_tasks,
            reduce_tasks,
            output_files,
            counters: counters.snapshot(),
        })
    }

    async fn run_map_phase<M, R>(
        &self,
        job: &Job<M, R>,
        splits: Vec<InputSplit>,
        counters: &Arc<Counters>,
    ) -> Result<Vec<Vec<(M::Key, M::Value)>>>
    where
        M: Mapper,
        R: Reducer<M::Key, M::Value>,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel.max(1)));
        let mut tasks = FuturesUnordered::new();

        for split in splits {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| scheduler_closed("map").with_source(e))?;
            let mapper = job.mapper.clone();
            let combiner = job.combiner.clone();
            let counters = counters.clone();

            tasks.push(tokio::task::spawn_blocking(move || {
                let split_id = split.id;
                let result = run_map_task(split, mapper.as_ref(), combiner.as_deref(), &counters);
                drop(permit);
                (split_id, result)
            }));
        }

        let mut outputs = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.next().await {
            let (split_id, result) = joined.map_err(|e| {
                MrError::task_with_code(ErrorCode::TASK_PANICKED, "map task panicked", None)
                    .with_source(e)
            })?;
            outputs.push((split_id, result?));
        }

        outputs.sort_by_key(|(split_id, _)| *split_id);
        Ok(outputs.into_iter().map(|(_, pairs)| pairs).collect())
    }

    async fn run_reduce_phase<M, R>(
        &self,
        job: &Job<M, R>,
        partitions: Vec<Partition<M::Key, M::Value>>,
        committer: &OutputCommitter,
        counters: &Arc<Counters>,
    ) -> Result<Vec<PathBuf>>
    where
        M: Mapper,
        R: Reducer<M::Key, M::Value>,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel.max(1)));
        let mut tasks = FuturesUnordered::new();

        for (index, partition) in partitions.into_iter().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| scheduler_closed("reduce").with_source(e))?;
            let reducer = job.reducer.clone();
            let counters = counters.clone();
            let separator = self.config.output_separator.clone();

            tasks.push(tokio::task::spawn_blocking(move || {
                let content = run_reduce_task(partition, reducer.as_ref(), &separator, &counters);
                drop(permit);
                (index, content)
            }));
        }

        let mut output_files = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.next().await {
            let (index, content) = joined.map_err(|e| {
                MrError::task_with_code(ErrorCode::TASK_PANICKED, "reduce task panicked", None)
                    .with_source(e)
            })?;
            output_files.push(committer.write_part(index, &content).await?);
        }

        output_files.sort();
        Ok(output_files)
    }
}

fn scheduler_closed(phase: &str) -> MrError {
    MrError::task_with_code(
        ErrorCode::TASK_GENERIC,
        format!("{} scheduler closed", phase),
        None,
    )
}

fn run_map_task<M: Mapper>(
    split: InputSplit,
    mapper: &M,
    combiner: Option<&dyn Combiner<M::Key, M::Value>>,
    counters: &Counters,
) -> Result<Vec<(M::Key, M::Value)>> {
    let task_id = format!("map-{:06}", split.id);
    debug!(
        "{} processing {} line(s) of {}",
        task_id,
        split.lines.len(),
        split.path.display()
    );

    let mut emitter = Emitter::new();
    for (offset, line) in split.lines.iter().enumerate() {
        counters.increment(Counter::MapInputRecords, 1);

        if let Err(err) = mapper.map(line, &mut emitter) {
            let line_number = split.first_line + offset + 1;
            match err.counter() {
                Some(counter) => {
                    counters.increment(counter, 1);
                    warn!(
                        "Skipping record {}:{}: {}",
                        split.path.display(),
                        line_number,
                        err
                    );
                }
                None => {
                    return Err(MrError::task_with_code(
                        ErrorCode::TASK_FATAL_RECORD,
                        format!("{}:{}: {}", split.path.display(), line_number, err),
                        Some(task_id),
                    )
                    .with_source(err));
                }
            }
        }
    }

    let pairs = emitter.into_pairs();
    counters.increment(Counter::MapOutputRecords, pairs.len() as u64);

    Ok(match combiner {
        Some(combiner) => combine_task_output(pairs, combiner, counters),
        None => pairs,
    })
}

fn combine_task_output<K: Ord + 'static, V: 'static>(
    pairs: Vec<(K, V)>,
    combiner: &dyn Combiner<K, V>,
    counters: &Counters,
) -> Vec<(K, V)> {
    counters.increment(Counter::CombineInputRecords, pairs.len() as u64);

    let combined: Vec<(K, V)> = shuffle::group_by_key(pairs)
        .into_iter()
        .map(|(key, values)| {
            let value = combiner.combine(&key, &mut values.into_iter());
            (key, value)
        })
        .collect();

    counters.increment(Counter::CombineOutputRecords, combined.len() as u64);
    combined
}

fn run_reduce_task<K, V, R>(
    partition: Partition<K, V>,
    reducer: &R,
    separator: &str,
    counters: &Counters,
) -> String
where
    K: Display + 'static,
    V: 'static,
    R: Reducer<K, V>,
{
    let mut buf = String::new();
    for (key, values) in partition {
        counters.increment(Counter::ReduceInputGroups, 1);
        counters.increment(Counter::ReduceInputRecords, values.len() as u64);

        if let Some(value) = reducer.reduce(&key, &mut values.into_iter()) {
            counters.increment(Counter::ReduceOutputRecords, 1);
            buf.push_str(&format!("{}{}{}\n", key, separator, value));
        }
    }
    buf
}
