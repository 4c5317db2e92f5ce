use std::path::Path;

use anyhow::{Context, Result};
use diagnostics::log_info;
use keyfs::EntryPath;

use crate::common::Session;

/// Copy a directory subtree out to `host_dir`.
pub async fn export_command(session: &Session, path: Option<&str>, host_dir: &Path) -> Result<String> {
    let workspace = session.open_workspace().await?;
    let dir = path.map(EntryPath::parse).unwrap_or_else(EntryPath::root);

    let written = workspace
        .export_directory(&dir, host_dir)
        .await
        .with_context(|| format!("Failed to export {dir} to {}", host_dir.display()))?;

    let shown = host_dir.display().to_string();
    log_info!("Exported {count} files to {dir}", count: written, dir: shown.as_str());
    Ok(format!("Exported {written} files to {shown}\n"))
}
