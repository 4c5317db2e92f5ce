use anyhow::{Result, bail};
use diagnostics::log_info;

use crate::common::Session;

/// Create the store file, seeding the welcome file when configured.
pub async fn init_command(session: &Session) -> Result<String> {
    if session.store_path.exists() {
        bail!("Store already exists: {}", session.store_path.display());
    }

    let workspace = session.open_store().await?;
    // Nothing is written when the welcome file is disabled
    workspace.mutator().store().flush().await?;

    let shown = session.store_path.display().to_string();
    log_info!("Initialized store at {path}", path: shown.as_str());
    Ok(format!("Initialized store at {shown}\n"))
}
