//! JSON record persistence shared by the token store and measurement cache.
//!
//! Each record is a single JSON file. Writes go to a sibling temporary file
//! which is then renamed over the target, so a reader never observes a
//! half-written record.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors from reading or writing a persisted record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded or decoded
    #[error("invalid record in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and decode a record.
///
/// Returns `Ok(None)` if the file does not exist.
pub(crate) fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| StoreError::Json {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Encode and write a record, replacing any previous one.
///
/// Creates parent directories if they don't exist.
pub(crate) fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(record).map_err(|e| StoreError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;

    let tmp = tmp_path(path);
    std::fs::write(&tmp, json).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;

    Ok(())
}

/// Remove a record. Returns whether a file was actually removed.
pub(crate) fn remove_record(path: &Path) -> Result<bool, StoreError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn missing_record_reads_as_none() {
        let dir = tempdir().unwrap();
        let read: Option<BTreeMap<String, String>> =
            read_record(&dir.path().join("absent.json")).unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("record.json");

        let mut record = BTreeMap::new();
        record.insert("key".to_string(), "value".to_string());
        write_record(&path, &record).unwrap();

        let read: BTreeMap<String, String> = read_record(&path).unwrap().unwrap();
        assert_eq!(read, record);
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn garbage_is_a_json_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("record.json");
        std::fs::write(&path, "not json").unwrap();

        let err = read_record::<BTreeMap<String, String>>(&path).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }

    #[test]
    fn remove_reports_whether_file_existed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("record.json");
        std::fs::write(&path, "{}").unwrap();

        assert!(remove_record(&path).unwrap());
        assert!(!remove_record(&path).unwrap());
    }
}
