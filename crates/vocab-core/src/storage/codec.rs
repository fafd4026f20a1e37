//! Database file codecs
//!
//! A backing file holds exactly two values in a fixed order: the database
//! name, then the word → record dictionary. Both codecs encode that pair as
//! a two-element sequence so files keep the same logical shape whichever
//! format is selected.
//!
//! Writes are atomic (write to temp file, then rename) to prevent corruption.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::error::{StorageError, StorageResult};
use crate::record::Record;

/// Word → record dictionary as stored on disk
pub type RecordMap = BTreeMap<String, Record>;

/// Supported on-disk formats
///
/// Chosen once in [`crate::Config`] and handed to every database at
/// construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// CBOR (compact binary)
    Cbor,
}

impl Codec {
    /// File extension used for new databases
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::Json => "json",
            Codec::Cbor => "cbor",
        }
    }

    /// Guess the codec of an existing file from its extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }

    /// Encode `(name, data)` and atomically write it to `path`
    pub fn serialize_list(&self, name: &str, data: &RecordMap, path: &Path) -> StorageResult<()> {
        let bytes = self.encode(name, data)?;
        atomic_write(path, &bytes)
    }

    /// Read `path` and decode the `(name, data)` pair
    pub fn deserialize_list(&self, path: &Path) -> StorageResult<(String, RecordMap)> {
        let bytes =
            fs::read(path).map_err(|e| StorageError::from_read_io(e, path.to_path_buf()))?;
        self.decode(&bytes, path)
    }

    /// Encode `(name, data)` to bytes
    pub fn encode(&self, name: &str, data: &RecordMap) -> StorageResult<Vec<u8>> {
        let pair = (name, data);
        match self {
            Codec::Json => serde_json::to_vec_pretty(&pair).map_err(|e| StorageError::Encode {
                name: name.to_string(),
                details: e.to_string(),
            }),
            Codec::Cbor => {
                let mut bytes = Vec::new();
                ciborium::into_writer(&pair, &mut bytes).map_err(|e| StorageError::Encode {
                    name: name.to_string(),
                    details: e.to_string(),
                })?;
                Ok(bytes)
            }
        }
    }

    /// Decode bytes read from `path`
    pub fn decode(&self, bytes: &[u8], path: &Path) -> StorageResult<(String, RecordMap)> {
        let decoded: Result<(String, RecordMap), String> = match self {
            Codec::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
            Codec::Cbor => ciborium::from_reader(bytes).map_err(|e| e.to_string()),
        };

        decoded.map_err(|details| StorageError::Decode {
            path: path.to_path_buf(),
            details,
        })
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Codec {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Codec::Json),
            "cbor" => Ok(Codec::Cbor),
            other => Err(StorageError::InvalidArgument(format!(
                "unknown codec '{}' (expected json or cbor)",
                other
            ))),
        }
    }
}

/// Write data to a file atomically
///
/// 1. Write to a uniquely named temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| StorageError::CreateDirectory {
        path: dir.to_path_buf(),
        source: e,
    })?;

    // Temp file must live in the same directory for the rename to be atomic
    let mut file =
        NamedTempFile::new_in(dir).map_err(|e| StorageError::from_io(e, dir.to_path_buf()))?;
    let temp_path = file.path().to_path_buf();

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.as_file()
        .sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.persist(path)
        .map_err(|e| StorageError::AtomicWriteFailed {
            from: temp_path,
            to: path.to_path_buf(),
            source: e.error,
        })?;

    Ok(())
}
