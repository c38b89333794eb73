/*!
 * File content collection with binary and size filtering
 *
 * Reads are independent and run in parallel. A file that is unreadable,
 * oversized, or binary is excluded from the pipeline and logged at trace
 * level; it never fails the run.
 */

use std::fs;
use std::path::Path;

use rayon::prelude::*;

use crate::types::FileRecord;

/// Files larger than this are excluded before any full read.
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Leading bytes inspected for binary classification.
const BINARY_CHECK_WINDOW: usize = 1024;

/// Read the selected paths into `FileRecord`s, preserving selection order.
pub fn collect_files(root: &Path, paths: &[String]) -> Vec<FileRecord> {
    paths
        .par_iter()
        .filter_map(|rel_path| collect_file(root, rel_path))
        .collect()
}

fn collect_file(root: &Path, rel_path: &str) -> Option<FileRecord> {
    let abs_path = root.join(rel_path);

    let metadata = match fs::metadata(&abs_path) {
        Ok(metadata) => metadata,
        Err(e) => {
            log::trace!("excluding {rel_path}: cannot stat: {e}");
            return None;
        }
    };
    if metadata.len() > MAX_FILE_SIZE {
        log::trace!(
            "excluding {rel_path}: size {} exceeds the {} byte limit",
            metadata.len(),
            MAX_FILE_SIZE
        );
        return None;
    }

    let bytes = match fs::read(&abs_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::trace!("excluding {rel_path}: cannot read: {e}");
            return None;
        }
    };
    if is_binary(&bytes) {
        log::trace!("excluding {rel_path}: binary content");
        return None;
    }

    Some(FileRecord {
        path: rel_path.to_string(),
        content: String::from_utf8_lossy(&bytes).into_owned(),
        size: metadata.len(),
    })
}

/// A file is binary when its leading window contains a control byte other
/// than tab, line feed, or carriage return.
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .take(BINARY_CHECK_WINDOW)
        .any(|&byte| byte < 0x20 && !matches!(byte, b'\t' | b'\n' | b'\r'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn test_is_binary_detects_nul_in_window() {
        assert!(is_binary(b"ab\0cd"));
        assert!(is_binary(&[0x01, 0x02]));
        assert!(!is_binary(b"plain text\twith\ntabs and\r\nnewlines"));
        assert!(!is_binary(b""));
    }

    #[test]
    fn test_is_binary_ignores_bytes_past_window() {
        let mut bytes = vec![b'a'; 2048];
        bytes[2000] = 0;
        assert!(!is_binary(&bytes));
        bytes[100] = 0;
        assert!(is_binary(&bytes));
    }

    #[test]
    fn test_collect_reads_text_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        fs::write(dir.path().join("b.txt"), "world").unwrap();

        let paths = vec!["a.txt".to_string(), "b.txt".to_string()];
        let records = collect_files(dir.path(), &paths);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, "a.txt");
        assert_eq!(records[0].content, "hello");
        assert_eq!(records[0].size, 5);
        assert_eq!(records[1].path, "b.txt");
    }

    #[test]
    fn test_binary_file_excluded_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("data.txt")).unwrap();
        file.write_all(b"looks like text\0but is not").unwrap();
        fs::write(dir.path().join("real.txt"), "fine").unwrap();

        let paths = vec!["data.txt".to_string(), "real.txt".to_string()];
        let records = collect_files(dir.path(), &paths);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "real.txt");
    }

    #[test]
    fn test_oversized_file_excluded_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("huge.txt")).unwrap();
        file.set_len(MAX_FILE_SIZE + 1).unwrap();
        fs::write(dir.path().join("small.txt"), "ok").unwrap();

        let paths = vec!["huge.txt".to_string(), "small.txt".to_string()];
        let records = collect_files(dir.path(), &paths);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "small.txt");
    }

    #[test]
    fn test_missing_file_excluded_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec!["ghost.txt".to_string()];
        assert!(collect_files(dir.path(), &paths).is_empty());
    }
}
