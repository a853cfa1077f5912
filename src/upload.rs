//! Local handling of `uploadFile`.
//!
//! Classic clients send the file as a base64 encoded zip archive. The
//! archive is unpacked into a fresh temporary directory that outlives the
//! call, and the path of its first entry is returned to the client.

// ============================================================================
// Imports
// ============================================================================

use std::io::Cursor;
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use tracing::debug;
use zip::ZipArchive;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

const TEMP_DIR_PREFIX: &str = "bidi-upload-";

// ============================================================================
// Unzip
// ============================================================================

/// Unpacks a base64 encoded zip archive and returns the path of its first entry.
///
/// # Errors
///
/// - [`Error::Upload`] if the data is not base64, not a zip archive, or empty
/// - [`Error::Io`] if the temporary directory cannot be created or written
pub fn unzip_file(data: &str) -> Result<PathBuf> {
    let bytes = Base64Standard
        .decode(data.trim())
        .map_err(|e| Error::upload(format!("invalid base64 payload: {e}")))?;

    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::upload(format!("invalid zip archive: {e}")))?;

    if archive.len() == 0 {
        return Err(Error::upload("zip archive is empty"));
    }

    let first = archive
        .by_index(0)
        .map_err(|e| Error::upload(e.to_string()))?
        .enclosed_name()
        .ok_or_else(|| Error::upload("zip entry has an unsafe path"))?;

    let dir = tempfile::Builder::new()
        .prefix(TEMP_DIR_PREFIX)
        .tempdir()?
        .keep();

    archive
        .extract(&dir)
        .map_err(|e| Error::upload(format!("failed to extract archive: {e}")))?;

    let path = dir.join(first);
    debug!(path = %path.display(), "Unpacked uploaded file");
    Ok(path)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn zipped(entries: &[(&str, &str)]) -> String {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("start file");
            writer.write_all(contents.as_bytes()).expect("write");
        }
        let cursor = writer.finish().expect("finish");
        Base64Standard.encode(cursor.into_inner())
    }

    #[test]
    fn test_unzip_returns_first_entry() {
        let data = zipped(&[("report.txt", "hello"), ("other.txt", "ignored")]);
        let path = unzip_file(&data).expect("unzip");

        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("report.txt"));
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "hello");

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_invalid_base64() {
        let err = unzip_file("not base64!").unwrap_err();
        assert!(matches!(err, Error::Upload { .. }));
    }

    #[test]
    fn test_not_a_zip() {
        let err = unzip_file(&Base64Standard.encode(b"plain text")).unwrap_err();
        assert!(matches!(err, Error::Upload { .. }));
    }

    #[test]
    fn test_empty_archive() {
        let err = unzip_file(&zipped(&[])).unwrap_err();
        assert!(matches!(err, Error::Upload { .. }));
    }
}
