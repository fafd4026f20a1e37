//! Word command handlers

use anyhow::{Context, Result};

use vocab_core::{Session, StorageError};

use crate::output::Output;

/// Show one word
pub fn get(session: &Session, db: String, word: String, output: &Output) -> Result<()> {
    let record = session
        .view()
        .database(&db)?
        .get(&word)?
        .ok_or_else(|| anyhow::anyhow!("'{}' is not in '{}'", word, db))?;

    output.print_record(&record);
    Ok(())
}

/// Add one or more values to a word
///
/// Values added before a failing one are kept and saved.
pub fn add(
    session: &mut Session,
    db: String,
    word: String,
    values: Vec<String>,
    output: &Output,
) -> Result<()> {
    let result = session.view_mut().update(&db, &word, &values, None);

    if let Err(err @ StorageError::PartialUpdate { .. }) = &result {
        session
            .save()
            .with_context(|| format!("Failed to save after partial update: {}", err))?;
    }
    result.with_context(|| format!("Failed to add to '{}' in '{}'", word, db))?;

    session.save()?;
    output.success(&format!("Added {} to '{}': {}", word, db, values.join(", ")));
    Ok(())
}

/// Remove a word, or a single value of it
pub fn remove(
    session: &mut Session,
    db: String,
    word: String,
    value: Option<String>,
    output: &Output,
) -> Result<()> {
    session
        .view_mut()
        .database_mut(&db)?
        .remove(&word, value.as_deref())?;
    session.save()?;

    match value {
        Some(value) => output.success(&format!("Removed '{}' from {} in '{}'", value, word, db)),
        None => output.success(&format!("Removed {} from '{}'", word, db)),
    }
    Ok(())
}

/// Print every word of a database
pub fn print(session: &Session, db: String, output: &Output) -> Result<()> {
    let records: Vec<_> = session
        .view()
        .database(&db)?
        .records()
        .into_values()
        .collect();

    output.print_records(&db, &records);
    Ok(())
}
