//! Property tests for the job aggregations
//!
//! - Unique listener counts equal the number of distinct users per track
//! - STD totals are exact sums and the threshold is applied to the total
//! - Every malformed line bumps the invalid record counter exactly once
//! - Results do not depend on split size or partition count

use mrjobs::config::RunnerConfig;
use mrjobs::engine::{shuffle, Counter, Emitter, LocalRunner, Mapper, Reducer};
use mrjobs::jobs::std_subscribers::{self, CallDurationMapper, StdMinutesReducer};
use mrjobs::jobs::unique_listeners::{self, PlayEventMapper, UniqueListenersReducer};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use tempfile::TempDir;

fn play_line(track: i32, user: i32) -> String {
    format!("x|x|{}|{}|x", track, user)
}

fn cdr_line(from: u32, minutes: u32, std: bool) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!(
        "{}|8983006310|2015-03-01 00:00:00|2015-03-01 {:02}:{:02}:30|{}",
        from,
        hours,
        mins,
        if std { 1 } else { 0 }
    )
}

fn map_all<M: Mapper>(mapper: &M, lines: &[String]) -> Vec<(M::Key, M::Value)> {
    let mut emitter = Emitter::new();
    for line in lines {
        mapper.map(line, &mut emitter).unwrap();
    }
    emitter.into_pairs()
}

fn run_job_blocking(kind: &str, content: &str, config: RunnerConfig) -> (String, u64) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, content).unwrap();
    let output = dir.path().join("out");

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let runner = LocalRunner::new(config);
    let report = runtime
        .block_on(async {
            match kind {
                "std" => runner.run(&std_subscribers::job(), &input, &output).await,
                _ => {
                    let job = unique_listeners::job(runner.config().play_events);
                    runner.run(&job, &input, &output).await
                }
            }
        })
        .unwrap();

    let mut lines: Vec<String> = report
        .output_files
        .iter()
        .flat_map(|path| {
            fs::read_to_string(path)
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();
    lines.sort();
    (lines.join("\n"), report.counters.get(Counter::InvalidRecordCount))
}

fn plays_strategy() -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((0i32..8, 0i32..20), 0..60)
}

proptest! {
    #[test]
    fn prop_unique_listeners_match_distinct_users(plays in plays_strategy()) {
        let lines: Vec<String> = plays.iter().map(|(t, u)| play_line(*t, *u)).collect();
        let pairs = map_all(&PlayEventMapper::default(), &lines);

        let mut expected: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();
        for (track, user) in &plays {
            expected.entry(*track).or_default().insert(*user);
        }

        let grouped = shuffle::group_by_key(pairs);
        prop_assert_eq!(grouped.len(), expected.len());
        for (track, users) in grouped {
            let count = UniqueListenersReducer
                .reduce(&track, &mut users.into_iter())
                .unwrap();
            prop_assert_eq!(count, expected[&track].len());
            prop_assert!(count >= 1);
        }
    }

    #[test]
    fn prop_std_totals_and_threshold(
        calls in prop::collection::vec((0u32..5, 0u32..90, any::<bool>()), 0..40)
    ) {
        let lines: Vec<String> = calls.iter().map(|(f, m, s)| cdr_line(*f, *m, *s)).collect();
        let pairs = map_all(&CallDurationMapper, &lines);

        let mut totals: BTreeMap<String, i64> = BTreeMap::new();
        for (from, minutes, std) in &calls {
            if *std {
                *totals.entry(from.to_string()).or_default() += i64::from(*minutes);
            }
        }

        let reducer = StdMinutesReducer::default();
        let grouped = shuffle::group_by_key(pairs);
        for (from, minutes) in grouped {
            let result = reducer.reduce(&from, &mut minutes.into_iter());
            let total = totals[&from];
            if total >= 60 {
                prop_assert_eq!(result, Some(total));
            } else {
                prop_assert_eq!(result, None);
            }
        }
    }

    #[test]
    fn prop_partitioning_is_stable(key in any::<i32>(), partitions in 1usize..16) {
        let first = shuffle::partition_for(&key, partitions);
        prop_assert!(first < partitions);
        prop_assert_eq!(first, shuffle::partition_for(&key, partitions));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_invalid_lines_counted_once_each(
        plays in plays_strategy(),
        broken in prop::collection::vec("[a-z0-9]{0,8}(\\|[a-z0-9]{0,8}){0,2}", 0..10),
    ) {
        let mut lines: Vec<String> = plays.iter().map(|(t, u)| play_line(*t, *u)).collect();
        lines.extend(broken.iter().cloned());
        let content: String = lines.iter().map(|l| format!("{}\n", l)).collect();

        let (_, invalid) = run_job_blocking("listeners", &content, RunnerConfig::default());
        prop_assert_eq!(invalid, broken.len() as u64);
    }

    #[test]
    fn prop_output_independent_of_layout(
        plays in plays_strategy(),
        split_lines in 1usize..10,
        reducers in 1usize..4,
    ) {
        let content: String = plays
            .iter()
            .map(|(t, u)| format!("{}\n", play_line(*t, *u)))
            .collect();

        let (baseline, _) = run_job_blocking("listeners", &content, RunnerConfig::default());
        let config = RunnerConfig {
            split_lines,
            reducers,
            max_parallel: 2,
            ..RunnerConfig::default()
        };
        let (result, _) = run_job_blocking("listeners", &content, config);
        prop_assert_eq!(baseline, result);
    }

    #[test]
    fn prop_std_output_independent_of_layout(
        calls in prop::collection::vec((0u32..5, 0u32..90, any::<bool>()), 0..40),
        split_lines in 1usize..10,
        reducers in 1usize..4,
    ) {
        let content: String = calls
            .iter()
            .map(|(f, m, s)| format!("{}\n", cdr_line(*f, *m, *s)))
            .collect();

        let (baseline, _) = run_job_blocking("std", &content, RunnerConfig::default());
        let config = RunnerConfig {
            split_lines,
            reducers,
            ..RunnerConfig::default()
        };
        let (result, _) = run_job_blocking("std", &content, config);
        prop_assert_eq!(baseline, result);
    }
}
