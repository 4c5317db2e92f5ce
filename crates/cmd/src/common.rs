use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::ValueEnum;
use keyfs::{
    ConfirmAll, DeclineAll, EntryKind, EntryPath, JsonFileStore, Prompter, Workspace,
    WorkspaceConfig,
};

use crate::prompt::TerminalPrompter;

/// Environment variable naming the store file when `--store` is absent.
pub const STORE_ENV: &str = "KEYFS_STORE";

/// How questions are answered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PromptMode {
    /// Ask on the terminal
    #[default]
    Ask,
    /// Accept every confirmation, cancel every rename
    Yes,
    /// Decline every confirmation, cancel every rename
    No,
}

/// Get the store path with an optional override, falling back to `KEYFS_STORE`.
pub fn get_store_path_with_override(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }

    env::var(STORE_ENV)
        .map(PathBuf::from)
        .map_err(|_| anyhow!("{STORE_ENV} environment variable not set and no --store given"))
}

/// Everything a command needs to open the workspace.
#[derive(Clone, Debug)]
pub struct Session {
    pub store_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub prompt_mode: PromptMode,
}

impl Session {
    pub fn new(
        store_override: Option<PathBuf>,
        config_path: Option<PathBuf>,
        prompt_mode: PromptMode,
    ) -> Result<Self> {
        Ok(Self {
            store_path: get_store_path_with_override(store_override)?,
            config_path,
            prompt_mode,
        })
    }

    pub async fn config(&self) -> Result<WorkspaceConfig> {
        match &self.config_path {
            Some(path) => WorkspaceConfig::load(path)
                .await
                .with_context(|| format!("Failed to read config file: {}", path.display())),
            None => Ok(WorkspaceConfig::default()),
        }
    }

    fn prompter(&self) -> Arc<dyn Prompter> {
        match self.prompt_mode {
            PromptMode::Ask => Arc::new(TerminalPrompter::new()),
            PromptMode::Yes => Arc::new(ConfirmAll),
            PromptMode::No => Arc::new(DeclineAll),
        }
    }

    /// Open the workspace over an existing store file.
    pub async fn open_workspace(&self) -> Result<Workspace> {
        if !self.store_path.exists() {
            bail!(
                "No store at {}. Run 'kfs init' first.",
                self.store_path.display()
            );
        }
        self.open_store().await
    }

    pub(crate) async fn open_store(&self) -> Result<Workspace> {
        let config = self.config().await?;
        let store = JsonFileStore::open(&self.store_path)
            .await
            .with_context(|| format!("Failed to open store: {}", self.store_path.display()))?;
        Workspace::open(Arc::new(store), &config, self.prompter())
            .await
            .context("Failed to load workspace")
    }
}

/// Work out whether `path` names a file or a directory.
///
/// A path can be both; `directory` picks the directory in that case.
pub fn entry_kind(workspace: &Workspace, path: &EntryPath, directory: bool) -> Result<EntryKind> {
    let tree = workspace.tree();
    let is_file = tree.contains(EntryKind::File, path);
    let is_dir = tree.contains(EntryKind::Directory, path);
    match (is_file, is_dir) {
        (true, true) if directory => Ok(EntryKind::Directory),
        (true, _) if !directory => Ok(EntryKind::File),
        (false, true) => Ok(EntryKind::Directory),
        _ => Err(keyfs::Error::NotFound(path.clone()).into()),
    }
}
