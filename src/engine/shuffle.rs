//! Grouping of map output by key and assignment of keys to reduce partitions.
//!
//! These functions are pure and perform no I/O.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Keys grouped for one reduce partition, in ascending key order.
pub type Partition<K, V> = BTreeMap<K, Vec<V>>;

/// Pick the reduce partition for a key.
///
/// The hasher is unkeyed, so the same key always lands in the same partition
/// and reruns produce identical part files. `DefaultHasher`'s algorithm may
/// change between Rust releases, so the key-to-partition assignment is only
/// fixed for binaries built with the same toolchain. Sorted output within a
/// single partition does not depend on it.
pub fn partition_for<K: Hash>(key: &K, partitions: usize) -> usize {
    if partitions <= 1 {
        return 0;
    }
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() % partitions as u64) as usize
}

/// Collect pairs into a sorted key -> values map, keeping value arrival order.
pub fn group_by_key<K: Ord, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Partition<K, V> {
    let mut grouped: Partition<K, V> = BTreeMap::new();
    for (key, value) in pairs {
        grouped.entry(key).or_default().push(value);
    }
    grouped
}

/// Route the output of every map task into `partitions` sorted groups.
///
/// Task outputs are consumed in the order given, so callers pass them sorted
/// by split id to keep value order stable across runs.
pub fn shuffle<K, V>(task_outputs: Vec<Vec<(K, V)>>, partitions: usize) -> Vec<Partition<K, V>>
where
    K: Ord + Hash,
{
    let partitions = partitions.max(1);
    let mut routed: Vec<Partition<K, V>> = (0..partitions).map(|_| BTreeMap::new()).collect();

    for (key, value) in task_outputs.into_iter().flatten() {
        let index = partition_for(&key, partitions);
        routed[index].entry(key).or_default().push(value);
    }

    routed
}
