use anyhow::Result;
use keyfs::{EntryKind, EntryPath};

use crate::common::{Session, entry_kind};

/// Delete a file, or a directory with everything below it.
///
/// A non-empty directory is only removed after confirmation.
pub async fn rm_command(session: &Session, path: &str, directory: bool) -> Result<String> {
    let mut workspace = session.open_workspace().await?;
    let target = EntryPath::parse(path);

    match entry_kind(&workspace, &target, directory)? {
        EntryKind::File => {
            workspace.mutator_mut().delete_file(&target).await?;
            Ok(format!("Removed {target}\n"))
        }
        EntryKind::Directory => match workspace.delete_directory(&target).await? {
            Some(count) => Ok(format!("Removed {target}/ ({count} entries)\n")),
            None => Ok(format!("Kept {target}/\n")),
        },
    }
}
