//! Input discovery and splitting.
//!
//! An input path is either a single file or a directory. Directory entries
//! whose names start with `_` or `.` are treated as bookkeeping files (such as
//! `_SUCCESS` left by a previous job) and skipped, so the output of one job can
//! be fed straight into another.

use crate::error::{ErrorCode, MrError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// A contiguous run of lines from one input file, processed by one map task.
#[derive(Debug, Clone)]
pub struct InputSplit {
    pub id: usize,
    pub path: PathBuf,
    /// Zero-based line number of `lines[0]` within `path`.
    pub first_line: usize,
    pub lines: Vec<String>,
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('_') || n.starts_with('.'))
        .unwrap_or(false)
}

/// List the files to read for `input`, in name order.
pub async fn discover_files(input: &Path) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(input)
        .await
        .map_err(|e| MrError::input_io(input, e))?;

    if metadata.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut entries = fs::read_dir(input)
        .await
        .map_err(|e| MrError::input_io(input, e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MrError::input_io(input, e))?
    {
        let path = entry.path();
        if is_hidden(&path) {
            debug!("Skipping hidden input {}", path.display());
            continue;
        }
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| MrError::input_io(&path, e))?;
        if file_type.is_dir() {
            warn!("Skipping nested directory {}", path.display());
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

/// Split raw file content into lines, dropping `\n` or `\r\n` terminators.
///
/// Each line is decoded on its own and invalid UTF-8 becomes U+FFFD, so one bad
/// byte only affects the record it appears in.
pub fn decode_lines(content: &[u8]) -> Vec<String> {
    let mut lines: Vec<String> = content
        .split(|b| *b == b'\n')
        .map(|line| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            String::from_utf8_lossy(line).into_owned()
        })
        .collect();
    if content.is_empty() || content.ends_with(b"\n") {
        lines.pop();
    }
    lines
}

/// Read `files` and cut them into splits of at most `split_lines` lines.
///
/// Empty files produce no splits. Split ids are assigned in file order, then
/// line order.
pub async fn read_splits(files: &[PathBuf], split_lines: usize) -> Result<Vec<InputSplit>> {
    if split_lines == 0 {
        return Err(MrError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            "split_lines must be at least 1",
        ));
    }

    let mut splits = Vec::new();
    for path in files {
        let content = fs::read(path)
            .await
            .map_err(|e| MrError::input_io(path, e))?;
        let lines = decode_lines(&content);

        for (chunk_index, chunk) in lines.chunks(split_lines).enumerate() {
            splits.push(InputSplit {
                id: splits.len(),
                path: path.clone(),
                first_line: chunk_index * split_lines,
                lines: chunk.to_vec(),
            });
        }
        debug!("Read {} lines from {}", lines.len(), path.display());
    }

    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_discover_single_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cdr.txt");
        std::fs::write(&file, "a|b\n").unwrap();

        let files = discover_files(&file).await.unwrap();
        assert_eq!(files, vec![file]);
    }

    #[tokio::test]
    async fn test_discover_directory_skips_hidden_and_sorts() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), "2\n").unwrap();
        std::fs::write(dir.path().join("a.txt"), "1\n").unwrap();
        std::fs::write(dir.path().join("_SUCCESS"), "").unwrap();
        std::fs::write(dir.path().join(".a.txt.crc"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = discover_files(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_discover_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = discover_files(&dir.path().join("missing")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::INPUT_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_read_splits_chunks_lines() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.txt");
        let second = dir.path().join("b.txt");
        let empty = dir.path().join("c.txt");
        std::fs::write(&first, "1\n2\n3\n4\n5\n").unwrap();
        std::fs::write(&second, "6\r\n7\r\n").unwrap();
        std::fs::write(&empty, "").unwrap();

        let splits = read_splits(&[first.clone(), second.clone(), empty], 2)
            .await
            .unwrap();

        assert_eq!(splits.len(), 4);
        assert_eq!(splits[0].lines, vec!["1", "2"]);
        assert_eq!(splits[2].lines, vec!["5"]);
        assert_eq!(splits[2].first_line, 4);
        assert_eq!(splits[3].path, second);
        assert_eq!(splits[3].lines, vec!["6", "7"]);
        assert!(splits.iter().enumerate().all(|(i, s)| s.id == i));
    }

    #[test]
    fn test_decode_lines() {
        assert!(decode_lines(b"").is_empty());
        assert_eq!(decode_lines(b"a\nb"), vec!["a", "b"]);
        assert_eq!(decode_lines(b"a\r\n\nb\n"), vec!["a", "", "b"]);
        assert_eq!(decode_lines(b"\n"), vec![""]);
    }

    #[tokio::test]
    async fn test_read_splits_tolerates_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cdr.txt");
        std::fs::write(
            &file,
            b"111|999|2015-03-01 09:00:00|2015-03-01 10:05:30|1\n222|9\xff9|2015-03-01 09:00:00|2015-03-01 10:05:30|1\n",
        )
        .unwrap();

        let splits = read_splits(&[file], 10).await.unwrap();
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].lines.len(), 2);
        assert_eq!(
            splits[0].lines[1],
            "222|9\u{FFFD}9|2015-03-01 09:00:00|2015-03-01 10:05:30|1"
        );
    }

    #[tokio::test]
    async fn test_read_splits_rejects_zero_split_size() {
        let err = read_splits(&[], 0).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
    }
}
