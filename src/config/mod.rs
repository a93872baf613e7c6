//! Runner configuration
//!
//! Values come from three layers, later layers winning: an optional TOML file,
//! `MRJOBS_*` environment variables, then command-line flags.

use crate::error::{ErrorCode, MrError, Result};
use crate::jobs::unique_listeners::{PlayEventLayout, PLAY_EVENT_FIELDS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::debug;

pub const DEFAULT_SPLIT_LINES: usize = 100_000;
pub const DEFAULT_SEPARATOR: &str = "\t";

fn default_max_parallel() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Maximum number of map or reduce tasks running at once
    pub max_parallel: usize,
    /// Lines per input split (one map task per split)
    pub split_lines: usize,
    /// Number of reduce partitions, one output file each
    pub reducers: usize,
    /// Text placed between key and value in output lines
    pub output_separator: String,
    /// Field positions for play-event records
    pub play_events: PlayEventLayout,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            split_lines: DEFAULT_SPLIT_LINES,
            reducers: 1,
            output_separator: DEFAULT_SEPARATOR.to_string(),
            play_events: PlayEventLayout::default(),
        }
    }
}

impl RunnerConfig {
    /// Load from `path` when given, then apply environment overrides.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).await.map_err(|e| {
                    let code = if e.kind() == std::io::ErrorKind::NotFound {
                        ErrorCode::CONFIG_NOT_FOUND
                    } else {
                        ErrorCode::CONFIG_GENERIC
                    };
                    MrError::config_with_code(
                        code,
                        format!("cannot read configuration file {}", path.display()),
                    )
                    .with_source(e)
                })?;
                debug!("Loaded configuration from {}", path.display());
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };

        config.merge_env_vars()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env_with(|name| std::env::var(name).ok())
    }

    /// Apply `MRJOBS_*` overrides read through `lookup`.
    pub fn merge_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("MRJOBS_MAX_PARALLEL") {
            self.max_parallel = parse_env("MRJOBS_MAX_PARALLEL", &value)?;
        }
        if let Some(value) = lookup("MRJOBS_SPLIT_LINES") {
            self.split_lines = parse_env("MRJOBS_SPLIT_LINES", &value)?;
        }
        if let Some(value) = lookup("MRJOBS_REDUCERS") {
            self.reducers = parse_env("MRJOBS_REDUCERS", &value)?;
        }
        if let Some(value) = lookup("MRJOBS_OUTPUT_SEPARATOR") {
            self.output_separator = value;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("max_parallel", self.max_parallel),
            ("split_lines", self.split_lines),
            ("reducers", self.reducers),
        ] {
            if value == 0 {
                return Err(invalid_value(format!("{} must be at least 1", name)));
            }
        }

        let layout = &self.play_events;
        if layout.track_id_field >= PLAY_EVENT_FIELDS || layout.user_id_field >= PLAY_EVENT_FIELDS {
            return Err(invalid_value(format!(
                "play_events field indices must be below {}",
                PLAY_EVENT_FIELDS
            )));
        }
        if layout.track_id_field == layout.user_id_field {
            return Err(invalid_value(
                "play_events.track_id_field and play_events.user_id_field must differ",
            ));
        }

        Ok(())
    }
}

fn invalid_value(message: impl Into<String>) -> MrError {
    MrError::config_with_code(ErrorCode::CONFIG_INVALID_VALUE, message)
}

fn parse_env<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .map_err(|e| invalid_value(format!("{}={:?} is not valid", name, value)).with_source(e))
}
