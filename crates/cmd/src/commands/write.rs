use anyhow::Result;
use diagnostics::log_info;
use keyfs::EntryPath;

use crate::common::Session;

/// Create a file. The name gets the default extension when it has none.
pub async fn touch_command(session: &Session, path: &str, content: Option<&str>) -> Result<String> {
    let mut workspace = session.open_workspace().await?;
    let created = workspace
        .mutator_mut()
        .create_file(&EntryPath::parse(path), content.unwrap_or_default())
        .await?;
    Ok(format!("{created}\n"))
}

/// Replace the content of the current file, or of `path` when given.
pub async fn save_command(session: &Session, path: Option<&str>, content: &str) -> Result<String> {
    let mut workspace = session.open_workspace().await?;
    if let Some(path) = path {
        _ = workspace.open_file(&EntryPath::parse(path)).await?;
    }

    let changed = match workspace.current() {
        Some(current) => workspace.is_changed(current, content).await?,
        None => false,
    };
    workspace.save(content).await?;

    let shown = workspace
        .current()
        .map(ToString::to_string)
        .unwrap_or_default();
    if changed {
        log_info!("Saved {path}", path: shown.as_str());
        Ok(format!("Saved {shown}\n"))
    } else {
        Ok(format!("{shown} unchanged\n"))
    }
}
