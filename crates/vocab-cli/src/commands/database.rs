//! Database command handlers

use std::path::PathBuf;

use anyhow::{bail, Result};

use vocab_core::{MergeMode, Session};

use crate::output::Output;
use crate::prompt::confirm;

/// List attached databases
pub fn list(session: &Session, output: &Output) -> Result<()> {
    output.print_databases(session.view());
    Ok(())
}

/// Create a new empty database
pub fn create(
    session: &mut Session,
    name: String,
    path: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let path = session.create(&name, path)?;
    session.save()?;

    output.success(&format!("Created '{}' at {}", name, path.display()));
    Ok(())
}

/// Attach an existing database file
pub fn attach(session: &mut Session, path: PathBuf, output: &Output) -> Result<()> {
    let name = session.attach_file(&path)?;
    session.save()?;

    output.success(&format!("Attached '{}' from {}", name, path.display()));
    Ok(())
}

/// Detach a database, keeping its file
pub fn detach(session: &mut Session, name: String, output: &Output) -> Result<()> {
    let database = session.detach(&name)?;
    session.save()?;

    output.success(&format!(
        "Detached '{}' (file kept at {})",
        name,
        database.path().display()
    ));
    Ok(())
}

/// Detach a database and delete its file
pub fn delete(session: &mut Session, name: String, yes: bool, output: &Output) -> Result<()> {
    let database = session.view().database(&name)?;

    if !yes {
        if !output.should_prompt() {
            bail!("Refusing to delete '{}' without --yes", name);
        }
        println!(
            "Delete database '{}' ({} words) and its file {}",
            name,
            database.len(),
            database.path().display()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    session.delete(&name)?;
    session.save()?;

    output.success(&format!("Deleted database: {}", name));
    Ok(())
}

/// Merge every word of one database into another
pub fn merge(
    session: &mut Session,
    from: String,
    to: String,
    mode: MergeMode,
    output: &Output,
) -> Result<()> {
    let report = session.view_mut().merge(&from, &to, mode)?;
    session.save()?;

    output.success(&format!(
        "Merged '{}' into '{}' ({}): {} updated, {} created",
        from, to, mode, report.updated, report.created
    ));
    Ok(())
}
