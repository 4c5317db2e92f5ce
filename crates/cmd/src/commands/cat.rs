use anyhow::Result;
use keyfs::EntryPath;

use crate::common::Session;

/// Print the stored content of a file. Binary files show as their data URL.
pub async fn cat_command(session: &Session, path: &str) -> Result<String> {
    let workspace = session.open_workspace().await?;
    Ok(workspace.contents(&EntryPath::parse(path)).await?)
}

/// Make `path` the current file and print its content.
pub async fn open_command(session: &Session, path: &str) -> Result<String> {
    let mut workspace = session.open_workspace().await?;
    let opened = workspace.open_file(&EntryPath::parse(path)).await?;
    Ok(opened.content)
}
