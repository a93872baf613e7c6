//! Output directory handling: one `part-r-NNNNN` file per reduce partition and
//! a `_SUCCESS` marker written last.

use crate::error::{ErrorCode, MrError, Result};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

pub const SUCCESS_MARKER: &str = "_SUCCESS";

pub fn part_file_name(partition: usize) -> String {
    format!("part-r-{:05}", partition)
}

/// Writes reduce output into a job's output directory.
#[derive(Debug, Clone)]
pub struct OutputCommitter {
    dir: PathBuf,
}

impl OutputCommitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Reject an output location that would mix with earlier results.
    ///
    /// The directory may be absent or empty; anything else fails the job before
    /// any input is read.
    pub async fn check(&self) -> Result<()> {
        let metadata = match fs::metadata(&self.dir).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(MrError::output_io(&self.dir, e)),
        };

        if !metadata.is_dir() {
            return Err(MrError::output_with_code(
                ErrorCode::OUTPUT_NOT_A_DIRECTORY,
                "output path exists and is not a directory",
                Some(self.dir.clone()),
            ));
        }

        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| MrError::output_io(&self.dir, e))?;
        if entries
            .next_entry()
            .await
            .map_err(|e| MrError::output_io(&self.dir, e))?
            .is_some()
        {
            return Err(MrError::output_with_code(
                ErrorCode::OUTPUT_ALREADY_EXISTS,
                "output directory already exists and is not empty",
                Some(self.dir.clone()),
            ));
        }

        Ok(())
    }

    pub async fn setup(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| MrError::output_io(&self.dir, e))
    }

    pub async fn write_part(&self, partition: usize, content: &str) -> Result<PathBuf> {
        let path = self.dir.join(part_file_name(partition));
        fs::write(&path, content)
            .await
            .map_err(|e| MrError::output_io(&path, e))?;
        debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(path)
    }

    pub async fn commit(&self) -> Result<()> {
        let marker = self.dir.join(SUCCESS_MARKER);
        fs::write(&marker, b"")
            .await
            .map_err(|e| MrError::output_io(&marker, e))
    }
}
