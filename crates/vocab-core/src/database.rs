//! A single vocabulary database
//!
//! A [`Database`] is a named word → [`Record`] map backed by one file.
//! Every mutator works in memory; [`Database::dump`] is the only call that
//! touches the disk.
//!
//! ## Usage
//!
//! ```ignore
//! let mut db = Database::new("spanish", "/data/spanish.json", Codec::Json)?;
//! db.add("cat", "gato")?;
//! db.dump()?;
//!
//! let db = Database::load("/data/spanish.json", Codec::Json)?;
//! assert!(db.contains("cat"));
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::record::{today, Record};
use crate::storage::{Codec, RecordMap, StorageError, StorageResult};

/// One named, file-backed collection of records
#[derive(Debug, Clone)]
pub struct Database {
    name: String,
    path: PathBuf,
    codec: Codec,
    data: RecordMap,
}

impl Database {
    /// Create an empty database
    ///
    /// Nothing is written until [`Database::dump`] is called.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        codec: Codec,
    ) -> StorageResult<Self> {
        let name = name.into();
        validate_name(&name)?;

        Ok(Self {
            name,
            path: path.into(),
            codec,
            data: RecordMap::new(),
        })
    }

    /// Load a database from its backing file
    ///
    /// Fails with a not-found error when the file is missing and a decode
    /// error when the bytes are malformed, a record is filed under a key
    /// that does not match its own word, or a record repeats a value.
    pub fn load(path: impl AsRef<Path>, codec: Codec) -> StorageResult<Self> {
        let path = path.as_ref();
        let (name, data) = codec.deserialize_list(path)?;

        if name.trim().is_empty() {
            return Err(StorageError::Decode {
                path: path.to_path_buf(),
                details: "database name is empty".to_string(),
            });
        }

        for (key, record) in &data {
            if *key != record.word {
                return Err(StorageError::Decode {
                    path: path.to_path_buf(),
                    details: format!("record stored under '{}' is for '{}'", key, record.word),
                });
            }

            let mut seen = BTreeSet::new();
            if let Some(value) = record.contents.iter().find(|v| !seen.insert(v.as_str())) {
                return Err(StorageError::Decode {
                    path: path.to_path_buf(),
                    details: format!("'{}' lists '{}' more than once", key, value),
                });
            }
        }

        debug!(database = %name, path = ?path, words = data.len(), "Loaded database");

        Ok(Self {
            name,
            path: path.to_path_buf(),
            codec,
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Number of stored words
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // ==================== Reads ====================

    /// Get a copy of the record stored under `key`
    pub fn get(&self, key: &str) -> StorageResult<Option<Record>> {
        validate_key(key)?;
        Ok(self.data.get(key).cloned())
    }

    /// Get a copy of the record stored under `key`, or `default`
    pub fn get_or(&self, key: &str, default: Record) -> StorageResult<Record> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Check if a word is stored
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Snapshot of all stored words, sorted
    pub fn keys(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    /// Snapshot of the whole word → record map
    pub fn records(&self) -> RecordMap {
        self.data.clone()
    }

    // ==================== Mutations ====================

    /// Add a value dated today with a zero repeat count
    pub fn add(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.add_with(key, value, today(), 0)
    }

    /// Add a value under `key`, creating the record if needed
    ///
    /// On success the record's date and repeat count are overwritten with
    /// the supplied values. A value that is already stored is rejected and
    /// leaves the record untouched.
    pub fn add_with(
        &mut self,
        key: &str,
        value: &str,
        date: NaiveDate,
        repeat_count: u32,
    ) -> StorageResult<()> {
        validate_key(key)?;
        if value.trim().is_empty() {
            return Err(StorageError::InvalidArgument(format!(
                "value for '{}' must not be empty",
                key
            )));
        }

        if self.data.get(key).is_some_and(|r| r.has_value(value)) {
            return Err(StorageError::DuplicateValue {
                database: self.name.clone(),
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        let record = self
            .data
            .entry(key.to_string())
            .or_insert_with(|| Record::new(key));
        record.push_value(value);
        record.last_update = date;
        record.repeat_count = repeat_count;

        debug!(database = %self.name, key, value, "Added value");
        Ok(())
    }

    /// Remove a whole word, or a single value when `value` is given
    ///
    /// Removing the last value leaves an empty record in place; only
    /// `remove(key, None)` deletes the word.
    pub fn remove(&mut self, key: &str, value: Option<&str>) -> StorageResult<()> {
        validate_key(key)?;

        match value {
            None => {
                if self.data.remove(key).is_none() {
                    return Err(self.key_not_found(key));
                }
                debug!(database = %self.name, key, "Removed word");
            }
            Some(value) => {
                let Some(record) = self.data.get_mut(key) else {
                    return Err(self.key_not_found(key));
                };

                if !record.remove_value(value) {
                    return Err(StorageError::ValueNotFound {
                        database: self.name.clone(),
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                debug!(database = %self.name, key, value, "Removed value");
            }
        }

        Ok(())
    }

    /// Record a successful review of `key`
    ///
    /// Sets the date and bumps the repeat count. Returns the new count.
    pub fn mark_reviewed(&mut self, key: &str, date: NaiveDate) -> StorageResult<u32> {
        validate_key(key)?;

        let Some(record) = self.data.get_mut(key) else {
            return Err(self.key_not_found(key));
        };
        record.last_update = date;
        record.repeat_count = record.repeat_count.saturating_add(1);

        Ok(record.repeat_count)
    }

    /// Replace the record under its own word
    pub(crate) fn put_record(&mut self, record: Record) {
        self.data.insert(record.word.clone(), record);
    }

    /// Mutable access for merges inside the crate
    pub(crate) fn record_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.data.get_mut(key)
    }

    // ==================== Persistence ====================

    /// Write the database to its backing file
    ///
    /// Parent directories are created as needed.
    pub fn dump(&self) -> StorageResult<()> {
        self.codec.serialize_list(&self.name, &self.data, &self.path)?;
        debug!(database = %self.name, path = ?self.path, words = self.data.len(), "Dumped database");
        Ok(())
    }

    fn key_not_found(&self, key: &str) -> StorageError {
        StorageError::KeyNotFound {
            database: self.name.clone(),
            key: key.to_string(),
        }
    }
}

fn validate_key(key: &str) -> StorageResult<()> {
    if key.trim().is_empty() {
        return Err(StorageError::InvalidArgument(
            "key must be a non-empty word".to_string(),
        ));
    }
    Ok(())
}

/// Names double as file stems, so they must stay inside the data directory
pub(crate) fn validate_name(name: &str) -> StorageResult<()> {
    if name.trim().is_empty() {
        return Err(StorageError::InvalidArgument(
            "database name must not be empty".to_string(),
        ));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(StorageError::InvalidArgument(format!(
            "database name '{}' must not contain path separators or be '.' or '..'",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_db(temp_dir: &TempDir) -> Database {
        Database::new("spanish", temp_dir.path().join("spanish.json"), Codec::Json).unwrap()
    }

    #[test]
    fn test_new_rejects_blank_name() {
        let err = Database::new("  ", "x.json", Codec::Json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_add_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut db = test_db(&temp_dir);

        db.add("cat", "gato").unwrap();

        let record = db.get("cat").unwrap().unwrap();
        assert_eq!(record.word, "cat");
        assert_eq!(record.contents, vec!["gato"]);
        assert_eq!(record.last_update, today());
        assert_eq!(record.repeat_count, 0);
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut db = test_db(&temp_dir);

        db.add_with("cat", "gato", date(2024, 1, 1), 5).unwrap();
        let err = db.add_with("cat", "gato", date(2025, 1, 1), 9).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DuplicateValue);
        let record = db.get("cat").unwrap().unwrap();
        assert_eq!(record.contents, vec!["gato"]);
        // Metadata is untouched by a rejected add
        assert_eq!(record.last_update, date(2024, 1, 1));
        assert_eq!(record.repeat_count, 5);
    }

    #[test]
    fn test_add_overwrites_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let mut db = test_db(&temp_dir);

        db.add_with("cat", "gato", date(2024, 1, 1), 5).unwrap();
        db.add_with("cat", "minino", date(2023, 6, 1), 2).unwrap();

        let record = db.get("cat").unwrap().unwrap();
        assert_eq!(record.contents, vec!["gato", "minino"]);
        assert_eq!(record.last_update, date(2023, 6, 1));
        assert_eq!(record.repeat_count, 2);
    }

    #[test]
    fn test_blank_key_and_value_are_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let mut db = test_db(&temp_dir);

        assert_eq!(db.add("", "gato").unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(db.add("cat", " ").unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(db.get("").unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert!(db.is_empty());
    }

    #[test]
    fn test_get_returns_a_copy() {
        let temp_dir = TempDir::new().unwrap();
        let mut db = test_db(&temp_dir);
        db.add("cat", "gato").unwrap();

        let mut copy = db.get("cat").unwrap().unwrap();
        copy.contents.push("tampered".to_string());
        copy.repeat_count = 99;

        let stored = db.get("cat").unwrap().unwrap();
        assert_eq!(stored.contents, vec!["gato"]);
        assert_eq!(stored.repeat_count, 0);
    }

    #[test]
    fn test_get_or_default() {
        let temp_dir = TempDir::new().unwrap();
        let db = test_db(&temp_dir);

        let fallback = Record::new("missing");
        assert_eq!(db.get_or("missing", fallback.clone()).unwrap(), fallback);
        assert!(db.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_remove_word() {
        let temp_dir = TempDir::new().unwrap();
        let mut db = test_db(&temp_dir);
        db.add("cat", "gato").unwrap();

        db.remove("cat", None).unwrap();
        assert!(!db.contains("cat"));

        let err = db.remove("cat", None).unwrap_err();
        assert!(matches!(err, StorageError::KeyNotFound { .. }));
    }

    #[test]
    fn test_remove_single_value() {
        let temp_dir = TempDir::new().unwrap();
        let mut db = test_db(&temp_dir);
        db.add("cat", "gato").unwrap();
        db.add("cat", "minino").unwrap();

        db.remove("cat", Some("gato")).unwrap();
        assert_eq!(db.get("cat").unwrap().unwrap().contents, vec!["minino"]);

        let err = db.remove("cat", Some("gato")).unwrap_err();
        assert!(matches!(err, StorageError::ValueNotFound { .. }));

        let err = db.remove("dog", Some("perro")).unwrap_err();
        assert!(matches!(err, StorageError::KeyNotFound { .. }));
    }

    #[test]
    fn test_removing_last_value_keeps_empty_record() {
        let temp_dir = TempDir::new().unwrap();
        let mut db = test_db(&temp_dir);
        db.add("cat", "gato").unwrap();

        db.remove("cat", Some("gato")).unwrap();

        // The word is not auto-pruned
        assert!(db.contains("cat"));
        assert!(db.get("cat").unwrap().unwrap().contents.is_empty());
        assert_eq!(db.keys(), vec!["cat"]);

        // Only a whole-word removal deletes it
        db.remove("cat", None).unwrap();
        assert!(!db.contains("cat"));
    }

    #[test]
    fn test_keys_is_a_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let mut db = test_db(&temp_dir);
        db.add("dog", "perro").unwrap();
        db.add("cat", "gato").unwrap();

        let keys = db.keys();
        db.add("bird", "pájaro").unwrap();

        assert_eq!(keys, vec!["cat", "dog"]);
        assert_eq!(db.keys(), vec!["bird", "cat", "dog"]);
    }

    #[test]
    fn test_mark_reviewed() {
        let temp_dir = TempDir::new().unwrap();
        let mut db = test_db(&temp_dir);
        db.add_with("cat", "gato", date(2024, 1, 1), 1).unwrap();

        let count = db.mark_reviewed("cat", date(2024, 2, 2)).unwrap();

        assert_eq!(count, 2);
        let record = db.get("cat").unwrap().unwrap();
        assert_eq!(record.repeat_count, 2);
        assert_eq!(record.last_update, date(2024, 2, 2));
        assert!(db.mark_reviewed("dog", today()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_dump_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();

        for codec in [Codec::Json, Codec::Cbor] {
            let path = temp_dir
                .path()
                .join("nested")
                .join(format!("spanish.{}", codec.extension()));
            let mut db = Database::new("spanish", &path, codec).unwrap();
            db.add_with("cat", "gato", date(2024, 3, 3), 4).unwrap();
            db.add_with("cat", "minino", date(2024, 3, 4), 4).unwrap();
            db.add_with("dog", "perro", date(2022, 8, 9), 0).unwrap();
            db.dump().unwrap();

            let loaded = Database::load(&path, codec).unwrap();
            assert_eq!(loaded.name(), "spanish");
            assert_eq!(loaded.path(), path.as_path());
            assert_eq!(loaded.records(), db.records());
        }
    }

    #[test]
    fn test_mutations_are_in_memory_until_dump() {
        let temp_dir = TempDir::new().unwrap();
        let mut db = test_db(&temp_dir);

        db.add("cat", "gato").unwrap();
        assert!(!db.path().exists());

        db.dump().unwrap();
        db.add("dog", "perro").unwrap();

        let loaded = Database::load(db.path(), Codec::Json).unwrap();
        assert_eq!(loaded.keys(), vec!["cat"]);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Database::load(temp_dir.path().join("nope.json"), Codec::Json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_load_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "[\"spanish\", 42]").unwrap();

        let err = Database::load(&path, Codec::Json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeError);
    }

    #[test]
    fn test_load_rejects_mismatched_word() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mismatch.json");
        let content = r#"["spanish", {"cat": {
            "mapped_word": "dog",
            "contents": ["perro"],
            "last_update_date": "2024-01-01",
            "repeated_times": 0
        }}]"#;
        fs::write(&path, content).unwrap();

        let err = Database::load(&path, Codec::Json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeError);
        assert!(err.to_string().contains("dog"));
    }

    #[test]
    fn test_load_rejects_repeated_value() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("repeated.json");
        let content = r#"["spanish", {"cat": {
            "mapped_word": "cat",
            "contents": ["gato", "minino", "gato"],
            "last_update_date": "2024-01-01",
            "repeated_times": 0
        }}]"#;
        fs::write(&path, content).unwrap();

        let err = Database::load(&path, Codec::Json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeError);
        assert!(err.to_string().contains("gato"));
    }

    #[test]
    fn test_new_rejects_path_like_names() {
        for name in ["../../x", "a/b", "a\\b", ".", ".."] {
            let err = Database::new(name, "x.json", Codec::Json).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{}", name);
        }

        // Dots inside a plain file stem are fine
        assert!(Database::new("en..es", "x.json", Codec::Json).is_ok());
    }
}
