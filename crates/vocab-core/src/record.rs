//! Vocabulary records
//!
//! A [`Record`] is everything stored for one word: its translations, the
//! date it was last touched and how many times it has been reviewed.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Today's date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// One word's stored translations plus review metadata
///
/// Field names are renamed to match the on-disk layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    /// The word this record is stored under
    #[serde(rename = "mapped_word")]
    pub word: String,
    /// Translations, in insertion order, without duplicates
    pub contents: Vec<String>,
    /// Date of the most recent mutation
    #[serde(rename = "last_update_date")]
    pub last_update: NaiveDate,
    /// Number of explicit reviews
    #[serde(rename = "repeated_times")]
    pub repeat_count: u32,
}

impl Record {
    /// Create an empty record dated today
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            contents: Vec::new(),
            last_update: today(),
            repeat_count: 0,
        }
    }

    /// Create a record with explicit contents and metadata
    pub fn with_contents(
        word: impl Into<String>,
        contents: Vec<String>,
        last_update: NaiveDate,
        repeat_count: u32,
    ) -> Self {
        Self {
            word: word.into(),
            contents,
            last_update,
            repeat_count,
        }
    }

    /// Check whether a value is already stored
    pub fn has_value(&self, value: &str) -> bool {
        self.contents.iter().any(|v| v == value)
    }

    /// Append a value; returns false (and changes nothing) if it is a duplicate
    pub(crate) fn push_value(&mut self, value: &str) -> bool {
        if self.has_value(value) {
            return false;
        }
        self.contents.push(value.to_string());
        true
    }

    /// Remove a value; returns false if it was not present
    pub(crate) fn remove_value(&mut self, value: &str) -> bool {
        match self.contents.iter().position(|v| v == value) {
            Some(pos) => {
                self.contents.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Fold another record into this one, keeping the union of contents
    ///
    /// The later date wins and repeat counts are summed.
    pub(crate) fn extend_from(&mut self, other: &Record) {
        for value in &other.contents {
            self.push_value(value);
        }
        self.last_update = self.last_update.max(other.last_update);
        self.repeat_count = self.repeat_count.saturating_add(other.repeat_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_record_new() {
        let record = Record::new("cat");
        assert_eq!(record.word, "cat");
        assert!(record.contents.is_empty());
        assert_eq!(record.repeat_count, 0);
        assert_eq!(record.last_update, today());
    }

    #[test]
    fn test_push_value_rejects_duplicates() {
        let mut record = Record::new("cat");
        assert!(record.push_value("gato"));
        assert!(!record.push_value("gato"));
        assert_eq!(record.contents, vec!["gato"]);
    }

    #[test]
    fn test_remove_value() {
        let mut record = Record::new("cat");
        record.push_value("gato");
        record.push_value("chat");

        assert!(record.remove_value("gato"));
        assert!(!record.remove_value("gato"));
        assert_eq!(record.contents, vec!["chat"]);
    }

    #[test]
    fn test_extend_from() {
        let mut to = Record::with_contents("cat", vec!["gato".into()], date(2024, 1, 5), 1);
        let from = Record::with_contents(
            "cat",
            vec!["gato".into(), "chat".into()],
            date(2024, 3, 1),
            2,
        );

        to.extend_from(&from);

        assert_eq!(to.contents, vec!["gato", "chat"]);
        assert_eq!(to.repeat_count, 3);
        assert_eq!(to.last_update, date(2024, 3, 1));
    }

    #[test]
    fn test_extend_keeps_later_own_date() {
        let mut to = Record::with_contents("cat", vec![], date(2025, 1, 1), 0);
        let from = Record::with_contents("cat", vec!["gato".into()], date(2020, 1, 1), 4);

        to.extend_from(&from);

        assert_eq!(to.last_update, date(2025, 1, 1));
        assert_eq!(to.repeat_count, 4);
    }

    #[test]
    fn test_serialized_field_names() {
        let record = Record::with_contents("cat", vec!["gato".into()], date(2024, 2, 29), 7);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["mapped_word"], "cat");
        assert_eq!(json["contents"][0], "gato");
        assert_eq!(json["last_update_date"], "2024-02-29");
        assert_eq!(json["repeated_times"], 7);
    }
}
