//! Local map-reduce engine
//!
//! Jobs are expressed as a [`Mapper`], an optional [`Combiner`] and a
//! [`Reducer`]. The [`LocalRunner`] supplies the execution contract the jobs
//! rely on:
//!
//! - the mapper is invoked once per input line, across parallel map tasks
//! - every value emitted for a key reaches exactly one reducer invocation
//! - reducer values arrive as a single-pass iterator
//! - output is sorted by key within each partition

pub mod counters;
pub mod input;
pub mod output;
pub mod runner;
pub mod shuffle;

pub use counters::{Counter, CounterSnapshot, Counters};
pub use runner::{JobReport, LocalRunner};

use crate::record::RecordError;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;

/// Single-pass sequence of the values grouped under one key.
pub type Values<'a, V> = &'a mut dyn Iterator<Item = V>;

/// Map stage: turns one input line into zero or more key/value pairs.
///
/// Returning an error skips the line; the runner counts it under
/// [`RecordError::counter`], or fails the job when the error is fatal.
pub trait Mapper: Send + Sync + 'static {
    type Key: Ord + Hash + Display + Send + 'static;
    type Value: Send + 'static;

    fn map(
        &self,
        line: &str,
        emitter: &mut Emitter<Self::Key, Self::Value>,
    ) -> Result<(), RecordError>;
}

/// Pre-aggregation run on each map task's output before the shuffle.
///
/// Must be associative and commutative: the reducer may see any mix of raw and
/// combined values for a key.
pub trait Combiner<K, V>: Send + Sync + 'static {
    fn combine(&self, key: &K, values: Values<'_, V>) -> V;
}

/// Reduce stage: folds all values of a key into at most one output value.
pub trait Reducer<K, V>: Send + Sync + 'static {
    type Output: Display + Send + 'static;

    fn reduce(&self, key: &K, values: Values<'_, V>) -> Option<Self::Output>;
}

/// Buffer collecting the pairs a mapper emits for one map task.
#[derive(Debug)]
pub struct Emitter<K, V> {
    pairs: Vec<(K, V)>,
}

impl<K, V> Default for Emitter<K, V> {
    fn default() -> Self {
        Self { pairs: Vec::new() }
    }
}

impl<K, V> Emitter<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, key: K, value: V) {
        self.pairs.push((key, value));
    }

    pub fn into_pairs(self) -> Vec<(K, V)> {
        self.pairs
    }
}

/// A named mapper/reducer pair, ready to hand to a runner.
pub struct Job<M: Mapper, R> {
    name: &'static str,
    mapper: Arc<M>,
    combiner: Option<Arc<dyn Combiner<M::Key, M::Value>>>,
    reducer: Arc<R>,
}

impl<M, R> Job<M, R>
where
    M: Mapper,
    R: Reducer<M::Key, M::Value>,
{
    pub fn new(name: &'static str, mapper: M, reducer: R) -> Self {
        Self {
            name,
            mapper: Arc::new(mapper),
            combiner: None,
            reducer: Arc::new(reducer),
        }
    }

    pub fn with_combiner(mut self, combiner: impl Combiner<M::Key, M::Value>) -> Self {
        self.combiner = Some(Arc::new(combiner));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    pub fn reducer(&self) -> &R {
        &self.reducer
    }

    pub fn has_combiner(&self) -> bool {
        self.combiner.is_some()
    }
}
