//! CLI argument structures
//!
//! Both job binaries take the same arguments; only the command name and
//! description differ, so the parser is built per [`JobKind`].

use crate::config::RunnerConfig;
use clap::{CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// The job a binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    StdSubscribers,
    UniqueListeners,
}

impl JobKind {
    pub fn command_name(self) -> &'static str {
        match self {
            Self::StdSubscribers => "stdsubscribers",
            Self::UniqueListeners => "uniquelisteners",
        }
    }

    pub fn about(self) -> &'static str {
        match self {
            Self::StdSubscribers => {
                "Find subscribers with at least 60 minutes of STD calls in Call Data Records"
            }
            Self::UniqueListeners => "Count unique listeners per track in play-event records",
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct JobArgs {
    /// Input file, or directory of input files
    #[arg(value_name = "IN")]
    pub input: PathBuf,

    /// Output directory (must not exist or be empty)
    #[arg(value_name = "OUT")]
    pub output: PathBuf,

    /// Enable verbose output (-v for debug, -vv for trace, -vvv to also trace dependencies)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Number of reduce partitions (one output file each)
    #[arg(short = 'r', long)]
    pub reducers: Option<usize>,

    /// Maximum number of tasks running at once
    #[arg(short = 'j', long)]
    pub max_parallel: Option<usize>,

    /// Input lines per map task
    #[arg(long)]
    pub split_lines: Option<usize>,

    /// Write a JSON job report (counters, part files, timing) to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl JobArgs {
    /// Parse the process arguments, exiting with usage on error.
    pub fn parse_for(kind: JobKind) -> Self {
        Self::try_parse_from_for(kind, std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    pub fn try_parse_from_for<I, T>(kind: JobKind, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command()
            .name(kind.command_name())
            .bin_name(kind.command_name())
            .about(kind.about())
            .try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    /// Flags win over the configuration file and environment.
    pub fn apply_overrides(&self, config: &mut RunnerConfig) {
        if let Some(reducers) = self.reducers {
            config.reducers = reducers;
        }
        if let Some(max_parallel) = self.max_parallel {
            config.max_parallel = max_parallel;
        }
        if let Some(split_lines) = self.split_lines {
            config.split_lines = split_lines;
        }
    }
}
