//! Common test utilities and helpers
#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Call Data Records covering STD/non-STD calls and the 60 minute boundary.
pub const CDR_SAMPLE: &str = "\
9665128505|8983006310|2015-03-01 07:08:10|2015-03-01 08:12:15|0
9665128505|8983006310|2015-03-01 09:08:10|2015-03-01 09:12:15|1
9665128505|8983006310|2015-03-01 09:08:10|2015-03-01 10:12:15|1
9665128506|9665128505|2015-03-01 09:08:10|2015-03-01 10:12:15|1
9665128507|9665128505|2015-03-01 09:08:10|2015-03-01 10:12:15|1
9665128505|8983006310|2015-03-01 09:08:10|2015-03-01 10:12:15|1
9665128508|8983006310|2015-03-01 09:00:00|2015-03-01 09:59:59|1
9665128509|8983006310|2015-03-01 09:00:00|2015-03-01 09:30:00|1
9665128509|8983006310|2015-03-01 10:00:00|2015-03-01 10:30:45|1
";

/// Expected output of the STD subscribers job for [`CDR_SAMPLE`].
pub const CDR_EXPECTED: &str = "\
9665128505\t132
9665128506\t64
9665128507\t64
9665128509\t60
";

/// Play events with a duplicate listener and one malformed line.
pub const PLAYS_SAMPLE: &str = "\
x|x|7|100|x
x|x|7|100|x
x|x|7|200|x
x|x|12|100|x
x|x|12|100
x|x|3|300|x
";

pub const PLAYS_EXPECTED: &str = "\
3\t1
7\t2
12\t1
";

/// Temporary workspace holding a job's input file and output location.
pub struct JobFixture {
    temp_dir: TempDir,
}

impl JobFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to `name` under the fixture root and return its path.
    pub fn write_input(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn write_input_bytes(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn output_dir(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }
}

/// Concatenate every part file in `dir`, in part order.
pub fn read_parts(dir: &Path) -> Result<String> {
    let mut parts: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("part-r-"))
                .unwrap_or(false)
        })
        .collect();
    parts.sort();

    let mut content = String::new();
    for part in parts {
        content.push_str(&fs::read_to_string(part)?);
    }
    Ok(content)
}

/// Sort output lines so results from several partitions can be compared.
pub fn sorted_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    lines.sort();
    lines
}
