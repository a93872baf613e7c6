use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

/// Job-level failure raised by the runner or its configuration.
///
/// Record-level problems are not represented here; see
/// [`RecordError`](crate::record::RecordError). A record error only becomes an
/// `MrError` when it is fatal for the job.
#[derive(Error, Debug)]
pub enum MrError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Input error: {message}")]
    Input {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Output error: {message}")]
    Output {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Task error: {message}")]
    Task {
        code: u16,
        message: String,
        task: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MrError {
    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create an input error with specific code and path
    pub fn input_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Input {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create an output error with specific code and path
    pub fn output_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Output {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a task error with specific code and task id
    pub fn task_with_code(code: u16, message: impl Into<String>, task: Option<String>) -> Self {
        Self::Task {
            code,
            message: message.into(),
            task,
            source: None,
        }
    }

    /// Wrap an I/O failure on an input path.
    pub fn input_io(path: &Path, err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::INPUT_NOT_FOUND,
            std::io::ErrorKind::InvalidData => ErrorCode::INPUT_INVALID_DATA,
            _ => ErrorCode::INPUT_READ_FAILED,
        };
        Self::input_with_code(
            code,
            format!("cannot read {}", path.display()),
            Some(path.to_path_buf()),
        )
        .with_source(err)
    }

    /// Wrap an I/O failure on an output path.
    pub fn output_io(path: &Path, err: std::io::Error) -> Self {
        Self::output_with_code(
            ErrorCode::OUTPUT_WRITE_FAILED,
            format!("cannot write {}", path.display()),
            Some(path.to_path_buf()),
        )
        .with_source(err)
    }

    /// Add a source error to this error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Input { source: src, .. }
            | Self::Output { source: src, .. }
            | Self::Task { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Input { code, .. }
            | Self::Output { code, .. }
            | Self::Task { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Input { message, path, .. } => match path {
                Some(p) => format!("Input error at {}: {}", p.display(), message),
                None => format!("Input error: {}", message),
            },
            Self::Output { message, path, .. } => match path {
                Some(p) => format!("Output error at {}: {}", p.display(), message),
                None => format!("Output error: {}", message),
            },
            Self::Task { message, task, .. } => match task {
                Some(t) => format!("Task {} failed: {}", t, message),
                None => format!("Task failed: {}", message),
            },
        }
    }
}

/// Type alias for Results using MrError
pub type Result<T> = std::result::Result<T, MrError>;

impl From<toml::de::Error> for MrError {
    fn from(err: toml::de::Error) -> Self {
        MrError::config_with_code(ErrorCode::CONFIG_INVALID_TOML, "Invalid TOML syntax")
            .with_source(err)
    }
}
