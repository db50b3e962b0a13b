//! Temp-file helpers for loaders that read from disk.

use std::io::Write;

use tempfile::NamedTempFile;

/// Write `contents` to a fresh temp file whose name ends in `suffix`.
///
/// The file is removed when the returned handle is dropped.
pub fn write_temp_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("viewer-test-")
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_temp_file() {
        let file = write_temp_file("hello", ".csv");
        assert!(file.path().to_string_lossy().ends_with(".csv"));
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "hello");
    }
}
