use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use diagnostics::log_debug;
use keyfs::{EntryPath, Upload};

use crate::common::Session;

/// Copy host files into `destination` (the root when absent).
///
/// Clashing names are resolved together before anything is written; the
/// last file stored becomes the current file.
pub async fn upload_command(
    session: &Session,
    sources: &[PathBuf],
    destination: Option<&str>,
) -> Result<String> {
    let mut items = Vec::with_capacity(sources.len());
    for source in sources {
        let name = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("Not a file name: {}", source.display()))?;
        let bytes = tokio::fs::read(source)
            .await
            .with_context(|| format!("Failed to read {}", source.display()))?;
        log_debug!("Read {name} ({size} bytes)", name: name, size: bytes.len());
        items.push(Upload::new(name, bytes));
    }

    let mut workspace = session.open_workspace().await?;
    let dir = destination.map(EntryPath::parse).unwrap_or_else(EntryPath::root);
    let report = workspace.upload(items, &dir).await?;

    let mut output = String::new();
    for path in &report.written {
        output.push_str(&format!("Uploaded {path}\n"));
    }
    for name in &report.skipped {
        output.push_str(&format!("Skipped {name}\n"));
    }
    for (name, err) in &report.failed {
        output.push_str(&format!("Failed {name}: {err}\n"));
    }
    Ok(output)
}
