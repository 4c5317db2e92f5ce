use anyhow::Result;
use diagnostics::log_debug;
use keyfs::tree_format::{self, RenderOptions};
use keyfs::EntryPath;

use crate::common::Session;

/// Render the tree below `path` (the root when absent).
///
/// Closed directories are collapsed unless `all` is set.
pub async fn list_command(session: &Session, path: Option<&str>, all: bool) -> Result<String> {
    let workspace = session.open_workspace().await?;
    let dir = path.map(EntryPath::parse).unwrap_or_else(EntryPath::root);
    if !workspace.tree().is_directory(&dir) {
        return Err(keyfs::Error::NotADirectory(dir).into());
    }

    let options = RenderOptions {
        respect_open_state: !all,
        current: workspace.current(),
        visibility: None,
    };
    Ok(tree_format::render(workspace.tree(), &dir, &options))
}

/// Render only the entries matching `query`, with their ancestors.
pub async fn find_command(session: &Session, query: &str) -> Result<String> {
    let mut workspace = session.open_workspace().await?;
    log_debug!("Searching for {query}", query: query);

    let visibility = workspace.search(query).clone();
    let options = RenderOptions {
        respect_open_state: false,
        current: workspace.current(),
        visibility: Some(&visibility),
    };
    Ok(tree_format::render(workspace.tree(), &EntryPath::root(), &options))
}
