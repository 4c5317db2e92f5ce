use anyhow::Result;
use diagnostics::{log_debug, log_info};
use keyfs::EntryPath;

use crate::common::Session;

/// Create a directory, and its missing parents when `parents` is set.
pub async fn mkdir_command(session: &Session, path: &str, parents: bool) -> Result<String> {
    let mut workspace = session.open_workspace().await?;
    let target = EntryPath::parse(path);

    log_debug!("Creating directory {path}", path: path);

    let mut created = Vec::new();
    if parents {
        let missing: Vec<EntryPath> = target
            .ancestors()
            .chain(std::iter::once(target.clone()))
            .filter(|dir| !workspace.tree().is_directory(dir))
            .collect();
        for dir in missing {
            created.push(workspace.mutator_mut().create_directory(&dir).await?);
        }
    } else {
        created.push(workspace.mutator_mut().create_directory(&target).await?);
    }

    log_info!("Created {count} directories", count: created.len());
    Ok(created.iter().map(|dir| format!("{dir}/\n")).collect())
}
