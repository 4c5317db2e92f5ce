//! Editor-facing session over a store.
//!
//! A [`Workspace`] restores the tree, tracks the open file and exposes the
//! operations an editing surface needs: open, save, rename, remove, change
//! detection, uploads and folder export.

use crate::classify::{self, ContentClassifier, ContentKind, ExtensionClassifier};
use crate::codec::Category;
use crate::config::WorkspaceConfig;
use crate::conflict::Conflict;
use crate::error::{Error, Result};
use crate::mutator::TreeMutator;
use crate::path::EntryPath;
use crate::prompt::Prompter;
use crate::reserved::ReservedNameRegistry;
use crate::search::{SearchIndex, Visibility};
use crate::store::StoreRef;
use crate::tree::{EntryKind, Tree};
use crate::validate::NameValidator;
use diagnostics::{log_debug, log_info, log_warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A file handed to the editing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedFile {
    pub path: EntryPath,
    pub content: String,
    pub kind: ContentKind,
}

pub type OpenCallback = Box<dyn Fn(&OpenedFile) + Send + Sync>;

/// One file offered for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub written: Vec<EntryPath>,
    /// Conflicting names the user cancelled.
    pub skipped: Vec<String>,
    pub failed: Vec<(String, Error)>,
}

pub struct Workspace {
    mutator: TreeMutator,
    classifier: Arc<dyn ContentClassifier>,
    search: SearchIndex,
    on_open: Vec<OpenCallback>,
}

impl Workspace {
    /// Open with the built-in extension table and the configured reserved
    /// names.
    pub async fn open(
        store: StoreRef,
        config: &WorkspaceConfig,
        prompter: Arc<dyn Prompter>,
    ) -> Result<Self> {
        let reserved = Arc::new(config.reserved());
        Self::open_with(store, config, prompter, Arc::new(ExtensionClassifier), reserved).await
    }

    pub async fn open_with(
        store: StoreRef,
        config: &WorkspaceConfig,
        prompter: Arc<dyn Prompter>,
        classifier: Arc<dyn ContentClassifier>,
        reserved: Arc<dyn ReservedNameRegistry>,
    ) -> Result<Self> {
        let validator = NameValidator::new(store.clone(), classifier.clone(), reserved)
            .with_default_extension(config.default_extension.clone());
        let mutator = TreeMutator::load(store, validator, prompter).await?;

        let mut workspace = Self {
            mutator,
            classifier,
            search: SearchIndex::new(),
            on_open: Vec::new(),
        };

        let has_files = workspace
            .tree()
            .walk()
            .iter()
            .any(|entry| entry.kind == EntryKind::File);
        if !has_files && !config.welcome_file.is_empty() {
            log_info!("Seeding {name}", name: config.welcome_file.as_str());
            let welcome = workspace
                .mutator
                .create_file(&EntryPath::parse(&config.welcome_file), &config.welcome_content)
                .await?;
            workspace.mutator.select(&welcome).await?;
        }

        Ok(workspace)
    }

    #[must_use]
    pub fn tree(&self) -> &Tree {
        self.mutator.tree()
    }

    #[must_use]
    pub fn mutator(&self) -> &TreeMutator {
        &self.mutator
    }

    /// Direct access to structural operations.
    pub fn mutator_mut(&mut self) -> &mut TreeMutator {
        &mut self.mutator
    }

    #[must_use]
    pub fn current(&self) -> Option<&EntryPath> {
        self.mutator.selection()
    }

    fn require_current(&self) -> Result<EntryPath> {
        self.current().cloned().ok_or(Error::NoCurrentFile)
    }

    /// Register a callback run every time a file is opened.
    pub fn on_open<F>(&mut self, callback: F)
    where
        F: Fn(&OpenedFile) + Send + Sync + 'static,
    {
        self.on_open.push(Box::new(callback));
    }

    /// Make `path` the current file and hand it to every open callback.
    pub async fn open_file(&mut self, path: &EntryPath) -> Result<OpenedFile> {
        let content = self.mutator.read_content(path).await?;
        self.mutator.select(path).await?;

        let opened = OpenedFile {
            kind: self.classifier.kind_of(path.name().unwrap_or_default()),
            path: path.clone(),
            content,
        };
        for callback in &self.on_open {
            callback(&opened);
        }
        let shown = path.to_string();
        log_debug!("Opened {path}", path: shown.as_str());
        Ok(opened)
    }

    /// Replace the current file's content.
    pub async fn save(&mut self, content: &str) -> Result<()> {
        let current = self.require_current()?;
        self.mutator.write_content(&current, content).await
    }

    /// Rename the current file in place.
    pub async fn rename(&mut self, new_name: &str) -> Result<EntryPath> {
        let current = self.require_current()?;
        self.mutator.rename(EntryKind::File, &current, new_name).await
    }

    /// Delete the current file.
    pub async fn remove(&mut self) -> Result<()> {
        let current = self.require_current()?;
        self.mutator.delete_file(&current).await
    }

    pub async fn contents(&self, path: &EntryPath) -> Result<String> {
        self.mutator.read_content(path).await
    }

    /// True if the stored content differs from `content`.
    pub async fn is_changed(&self, path: &EntryPath, content: &str) -> Result<bool> {
        Ok(self.contents(path).await? != content)
    }

    #[must_use]
    pub fn has_file(&self, path: &EntryPath) -> bool {
        self.tree().contains(EntryKind::File, path)
    }

    /// Raw bytes of a file, decoding data URLs.
    pub async fn read_bytes(&self, path: &EntryPath) -> Result<Vec<u8>> {
        let content = self.contents(path).await?;
        Ok(classify::decode_data_url(&content).unwrap_or_else(|| content.into_bytes()))
    }

    /// Store `items` under `destination`, prompting for new names where they
    /// collide, then open the last file written.
    pub async fn upload(
        &mut self,
        items: Vec<Upload>,
        destination: &EntryPath,
    ) -> Result<UploadReport> {
        if !self.tree().is_directory(destination) {
            return Err(Error::not_found(destination));
        }

        let mut names = Vec::with_capacity(items.len());
        let mut conflicts = Vec::with_capacity(items.len());
        for item in &items {
            let (name, conflict) = self.check_upload_name(&item.name, destination).await?;
            names.push(name);
            conflicts.push(conflict);
        }

        let resolved = self
            .mutator
            .resolver()
            .resolve_conflicts(&names, &conflicts, destination, Category::File)
            .await?;

        let mut report = UploadReport::default();
        for (item, name) in items.into_iter().zip(resolved) {
            let Some(name) = name else {
                report.skipped.push(item.name);
                continue;
            };
            match self.write_upload(destination, &name, item.bytes).await {
                Ok(path) => report.written.push(path),
                Err(err) => {
                    let reason = err.to_string();
                    log_warn!("Upload of {name} failed: {reason}", name: name.as_str(), reason: reason.as_str());
                    report.failed.push((name, err));
                }
            }
        }

        if let Some(last) = report.written.last().cloned() {
            _ = self.open_file(&last).await?;
        }
        log_info!(
            "Uploaded {written} files, {skipped} skipped, {failed} failed",
            written: report.written.len(),
            skipped: report.skipped.len(),
            failed: report.failed.len()
        );
        Ok(report)
    }

    /// Canonical name for an upload and why it needs resolving, if it does.
    async fn check_upload_name(
        &self,
        name: &str,
        destination: &EntryPath,
    ) -> Result<(String, Option<Conflict>)> {
        match self
            .mutator
            .validator()
            .validate(name, destination, Category::File, true)
            .await
        {
            Ok(validated) => {
                let mut conflict = None;
                if let Some(warning) = &validated.warning {
                    let accepted = self
                        .mutator
                        .prompter()
                        .request_confirmation(&warning.message())
                        .await;
                    if !accepted {
                        let declined = Error::ReservedName(warning.stem.clone());
                        conflict = Some(Conflict::Rejected(declined.to_string()));
                    }
                }
                Ok((validated.name, conflict))
            }
            Err(err) if err.is_name_rule() => {
                Ok((name.to_string(), Some(Conflict::Rejected(err.to_string()))))
            }
            Err(err) => Err(err),
        }
    }

    async fn write_upload(
        &mut self,
        destination: &EntryPath,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<EntryPath> {
        let kind = self.classifier.kind_of(name);
        let content = if kind.is_binary() {
            classify::encode_data_url(&self.classifier.media_type(name), &bytes)
        } else {
            String::from_utf8(bytes).map_err(|_| Error::Store(format!("{name} is not UTF-8 text")))?
        };
        self.mutator.insert_file(destination, name, &content).await
    }

    /// Delete a directory, asking first when it is not empty.
    ///
    /// Returns the number of entries removed, or `None` if the user declined.
    pub async fn delete_directory(&mut self, path: &EntryPath) -> Result<Option<usize>> {
        let summary = self.mutator.summary(path).await?;
        if let Some(message) = summary.confirmation_message(path) {
            if !self.mutator.prompter().request_confirmation(&message).await {
                return Ok(None);
            }
        }
        Ok(Some(self.mutator.delete_directory(path).await?))
    }

    pub fn search(&mut self, query: &str) -> &Visibility {
        self.search.search(self.mutator.tree(), query)
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// Visibility under the active query, re-applied to the current tree.
    pub fn visible(&mut self, kind: EntryKind, path: &EntryPath) -> bool {
        self.search.refresh(self.mutator.tree()).is_visible(kind, path)
    }

    /// Write the subtree at `path` to `host_dir`. A non-root directory is
    /// written as `host_dir/<name>`. Returns the number of files written.
    pub async fn export_directory(&self, path: &EntryPath, host_dir: &Path) -> Result<usize> {
        if !self.tree().is_directory(path) {
            return Err(Error::not_a_directory(path));
        }
        let base = match path.name() {
            Some(name) => EntryPath::root().join(name),
            None => EntryPath::root(),
        };

        tokio::fs::create_dir_all(host_path(host_dir, &base)).await?;
        let mut written = 0;
        for entry in self.tree().descendants(path)? {
            let Some(relative) = entry.path.rebase(path, &base) else {
                continue;
            };
            let target = host_path(host_dir, &relative);
            match entry.kind {
                EntryKind::Directory => tokio::fs::create_dir_all(&target).await?,
                EntryKind::File => {
                    let bytes = self.read_bytes(&entry.path).await?;
                    tokio::fs::write(&target, bytes).await?;
                    written += 1;
                }
            }
        }

        let shown = path.to_string();
        log_info!("Exported {path} ({count} files)", path: shown.as_str(), count: written);
        Ok(written)
    }
}

fn host_path(root: &Path, path: &EntryPath) -> PathBuf {
    path.segments()
        .iter()
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
}
