use anyhow::Result;
use keyfs::{EntryPath, OpenState};

use crate::common::Session;

/// Flip a directory between open and closed.
pub async fn toggle_command(session: &Session, path: &str) -> Result<String> {
    let mut workspace = session.open_workspace().await?;
    let dir = EntryPath::parse(path);
    let state = workspace.mutator_mut().toggle(&dir).await?;
    let shown = match state {
        OpenState::Open => "open",
        OpenState::Closed => "closed",
    };
    Ok(format!("{dir}/ {shown}\n"))
}
