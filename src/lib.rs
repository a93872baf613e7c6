//! # mrjobs
//!
//! Two batch jobs on a local map-reduce runner.
//!
//! ## Usage
//!
//! ```bash
//! stdsubscribers [-c config.toml] [-r reducers] <IN> <OUT>
//! uniquelisteners [-c config.toml] [-r reducers] <IN> <OUT>
//! ```
//!
//! ## Modules
//!
//! - `cli` - Argument parsing, logging setup and job dispatch for the binaries
//! - `config` - Runner configuration from TOML, environment and flags
//! - `engine` - Mapper/Combiner/Reducer traits and the local runner
//! - `error` - Job-level error type with error codes
//! - `jobs` - The STD subscribers and unique listeners jobs
//! - `record` - Pipe-delimited field splitting and per-record errors
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod jobs;
pub mod record;
