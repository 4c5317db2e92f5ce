use anyhow::Result;
use diagnostics::log_info;
use keyfs::{EntryPath, MoveOutcome, OnConflict};

use crate::common::{PromptMode, Session, entry_kind};

/// Move a file or directory into `destination`.
///
/// A name clash asks for a new name on the terminal; non-interactive
/// sessions fail instead.
pub async fn mv_command(
    session: &Session,
    path: &str,
    destination: &str,
    directory: bool,
) -> Result<String> {
    let mut workspace = session.open_workspace().await?;
    let source = EntryPath::parse(path);
    let kind = entry_kind(&workspace, &source, directory)?;
    let on_conflict = match session.prompt_mode {
        PromptMode::Ask => OnConflict::Prompt,
        PromptMode::Yes | PromptMode::No => OnConflict::Fail,
    };

    let outcome = workspace
        .mutator_mut()
        .move_entry(kind, &source, &EntryPath::parse(destination), on_conflict)
        .await?;

    Ok(match outcome {
        MoveOutcome::Moved(target) => {
            let shown = target.to_string();
            log_info!("Moved {from} to {to}", from: path, to: shown.as_str());
            format!("{source} -> {target}\n")
        }
        MoveOutcome::Unchanged => format!("{source} is already in place\n"),
        MoveOutcome::Cancelled => "Move cancelled\n".to_string(),
    })
}

/// Rename a file or directory without moving it.
pub async fn rename_command(
    session: &Session,
    path: &str,
    new_name: &str,
    directory: bool,
) -> Result<String> {
    let mut workspace = session.open_workspace().await?;
    let source = EntryPath::parse(path);
    let kind = entry_kind(&workspace, &source, directory)?;
    let target = workspace
        .mutator_mut()
        .rename(kind, &source, new_name)
        .await?;
    Ok(format!("{source} -> {target}\n"))
}
