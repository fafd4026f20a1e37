//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use vocab_core::{DatabasesView, Record};

use crate::quiz::QuizSummary;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single record
    pub fn print_record(&self, record: &Record) {
        match self.format {
            OutputFormat::Human => {
                println!("Word:     {}", record.word);
                if record.contents.is_empty() {
                    println!("Contents: (none)");
                } else {
                    println!("Contents: {}", record.contents.join(", "));
                }
                println!("Updated:  {}", record.last_update.format("%Y-%m-%d"));
                println!("Repeated: {}", record.repeat_count);
            }
            OutputFormat::Json => {
                println!("{}", to_json(record));
            }
            OutputFormat::Quiet => {
                for value in &record.contents {
                    println!("{}", value);
                }
            }
        }
    }

    /// Print every record of a database
    pub fn print_records(&self, db_name: &str, records: &[Record]) {
        match self.format {
            OutputFormat::Human => {
                if records.is_empty() {
                    println!("No words in '{}'.", db_name);
                    return;
                }
                let width = records
                    .iter()
                    .map(|r| r.word.chars().count())
                    .max()
                    .unwrap_or(0)
                    .min(30);
                for record in records {
                    println!(
                        "{:<width$} | {} | {}x | {}",
                        truncate(&record.word, 30),
                        record.last_update.format("%Y-%m-%d"),
                        record.repeat_count,
                        truncate(&record.contents.join(", "), 50),
                        width = width
                    );
                }
                println!("\n{} word(s)", records.len());
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    to_json(&serde_json::json!({ "database": db_name, "records": records }))
                );
            }
            OutputFormat::Quiet => {
                for record in records {
                    println!("{}", record.word);
                }
            }
        }
    }

    /// Print attached databases with their links
    pub fn print_databases(&self, view: &DatabasesView) {
        match self.format {
            OutputFormat::Human => {
                if view.is_empty() {
                    println!("No databases attached.");
                    return;
                }
                for db in view.databases() {
                    println!("{} ({} words) {}", db.name(), db.len(), db.path().display());
                    for link in view.graph().links(db.name()) {
                        let arrow = if link.reverse { "<-" } else { "->" };
                        println!("  {} {}", arrow, link.target);
                    }
                }
                println!("\n{} database(s)", view.len());
            }
            OutputFormat::Json => {
                let databases: Vec<_> = view
                    .databases()
                    .map(|db| {
                        serde_json::json!({
                            "name": db.name(),
                            "path": db.path(),
                            "codec": db.codec(),
                            "words": db.len(),
                            "links": view.graph().links(db.name()),
                        })
                    })
                    .collect();
                println!("{}", to_json(&databases));
            }
            OutputFormat::Quiet => {
                for name in view.db_names() {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print the result of a quiz
    pub fn print_quiz_summary(&self, summary: &QuizSummary) {
        match self.format {
            OutputFormat::Human => {
                println!();
                println!("Score: {}/{}", summary.correct, summary.asked);
                if !summary.missed.is_empty() {
                    println!("Review:");
                    for word in &summary.missed {
                        println!("  {}", word);
                    }
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "asked": summary.asked,
                        "correct": summary.correct,
                        "missed": summary.missed,
                    })
                );
            }
            OutputFormat::Quiet => {
                println!("{}/{}", summary.correct, summary.asked);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an error as a single line on stderr
    pub fn error(&self, error: &anyhow::Error) {
        let message = format!("{:#}", error);
        match self.format {
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({"status": "error", "message": message})
                );
            }
            OutputFormat::Human | OutputFormat::Quiet => eprintln!("error: {}", message),
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        serde_json::json!({"status": "error", "message": e.to_string()}).to_string()
    })
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Counts characters, not bytes
        assert_eq!(truncate("pájaro", 6), "pájaro");
        assert_eq!(truncate("éééééééé", 5), "ééé...");
    }

    #[test]
    fn test_should_prompt() {
        assert!(Output::new(OutputFormat::Human).should_prompt());
        assert!(!Output::new(OutputFormat::Json).should_prompt());
        assert!(!Output::new(OutputFormat::Quiet).should_prompt());
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&serde_json::json!({"a": 1}));
        assert!(json.contains("\"a\": 1"));
    }
}
