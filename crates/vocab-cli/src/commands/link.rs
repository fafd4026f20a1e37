//! Link command handlers

use anyhow::Result;

use vocab_core::Session;

use crate::output::Output;

/// Link two databases
pub fn link(
    session: &mut Session,
    from: String,
    to: String,
    reverse: bool,
    output: &Output,
) -> Result<()> {
    session.view_mut().link(&from, &to, reverse)?;
    session.save()?;

    let arrow = if reverse { "<-" } else { "->" };
    output.success(&format!("Linked {} {} {}", from, arrow, to));
    Ok(())
}

/// Remove the first link between two databases
pub fn unlink(session: &mut Session, from: String, to: String, output: &Output) -> Result<()> {
    session.view_mut().unlink(&from, &to)?;
    session.save()?;

    output.success(&format!("Unlinked {} from {}", from, to));
    Ok(())
}
