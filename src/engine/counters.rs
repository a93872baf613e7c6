//! Job counters shared by every task of a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Named counters maintained by the runner and incremented for skipped records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Counter {
    MapInputRecords,
    MapOutputRecords,
    CombineInputRecords,
    CombineOutputRecords,
    ReduceInputGroups,
    ReduceInputRecords,
    ReduceOutputRecords,
    InvalidRecordCount,
    MalformedTimestampCount,
}

impl Counter {
    pub const COUNT: usize = 9;

    pub const ALL: [Counter; Counter::COUNT] = [
        Counter::MapInputRecords,
        Counter::MapOutputRecords,
        Counter::CombineInputRecords,
        Counter::CombineOutputRecords,
        Counter::ReduceInputGroups,
        Counter::ReduceInputRecords,
        Counter::ReduceOutputRecords,
        Counter::InvalidRecordCount,
        Counter::MalformedTimestampCount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::MapInputRecords => "MAP_INPUT_RECORDS",
            Self::MapOutputRecords => "MAP_OUTPUT_RECORDS",
            Self::CombineInputRecords => "COMBINE_INPUT_RECORDS",
            Self::CombineOutputRecords => "COMBINE_OUTPUT_RECORDS",
            Self::ReduceInputGroups => "REDUCE_INPUT_GROUPS",
            Self::ReduceInputRecords => "REDUCE_INPUT_RECORDS",
            Self::ReduceOutputRecords => "REDUCE_OUTPUT_RECORDS",
            Self::InvalidRecordCount => "INVALID_RECORD_COUNT",
            Self::MalformedTimestampCount => "MALFORMED_TIMESTAMP_COUNT",
        }
    }

    /// Counters that describe record quality rather than framework progress.
    pub fn is_job_counter(self) -> bool {
        matches!(
            self,
            Self::InvalidRecordCount | Self::MalformedTimestampCount
        )
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lock-free counter table, updated concurrently by map and reduce tasks.
#[derive(Debug, Default)]
pub struct Counters {
    values: [AtomicU64; Counter::COUNT],
}

impl Counters {
    pub fn increment(&self, counter: Counter, by: u64) {
        self.values[counter as usize].fetch_add(by, Ordering::Relaxed);
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.values[counter as usize].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            values: Counter::ALL
                .iter()
                .map(|c| (c.name().to_string(), self.get(*c)))
                .collect(),
        }
    }
}

/// Point-in-time copy of a run's counters, keyed by counter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterSnapshot {
    values: BTreeMap<String, u64>,
}

impl CounterSnapshot {
    pub fn get(&self, counter: Counter) -> u64 {
        self.values.get(counter.name()).copied().unwrap_or(0)
    }
}
