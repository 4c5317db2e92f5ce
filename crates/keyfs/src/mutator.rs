// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Structural operations over the store and the in-memory tree.
//!
//! Every operation computes the full set of key writes up front, applies it
//! as one [`ChangeSet`], and only touches the tree once the store accepted
//! it. A failed operation leaves both exactly as they were.

use crate::changes::ChangeSet;
use crate::codec::{self, CURRENT_FILE_KEY, Category, FILE_PATH_NAME_KEY};
use crate::conflict::ConflictResolver;
use crate::error::{Error, Result};
use crate::path::EntryPath;
use crate::prompt::Prompter;
use crate::store::StoreRef;
use crate::tree::{Entry, EntryKind, Node, OpenState, Tree};
use crate::validate::{NameValidator, Validated, canonical_file_name};
use diagnostics::{log_debug, log_info, log_warn};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// What to do when a move lands on an occupied name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    Fail,
    Prompt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(EntryPath),
    /// The entry already lives in the destination.
    Unchanged,
    /// The user cancelled the conflict prompt.
    Cancelled,
}

/// What a directory holds, for delete confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorySummary {
    Empty,
    FilesOnly,
    DirectoriesOnly,
    FilesAndDirectories,
}

impl DirectorySummary {
    fn from_flags(has_files: bool, has_directories: bool) -> Self {
        match (has_files, has_directories) {
            (false, false) => DirectorySummary::Empty,
            (true, false) => DirectorySummary::FilesOnly,
            (false, true) => DirectorySummary::DirectoriesOnly,
            (true, true) => DirectorySummary::FilesAndDirectories,
        }
    }

    /// Confirmation text for deleting `path`, `None` when nothing else goes.
    #[must_use]
    pub fn confirmation_message(self, path: &EntryPath) -> Option<String> {
        match self {
            DirectorySummary::Empty => None,
            DirectorySummary::FilesOnly => Some(format!(
                "\"{path}\" contains files, which will also be deleted. Are you sure you want to continue?"
            )),
            DirectorySummary::DirectoriesOnly => Some(format!(
                "\"{path}\" contains other empty directories in it. Are you sure you want to continue?"
            )),
            DirectorySummary::FilesAndDirectories => Some(format!(
                "\"{path}\" contains files and sub-directories, all of which will be deleted. Are you sure you want to continue?"
            )),
        }
    }
}

/// Published after every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    Created(Entry),
    Moved {
        kind: EntryKind,
        from: EntryPath,
        to: EntryPath,
    },
    Deleted {
        kind: EntryKind,
        path: EntryPath,
        removed: usize,
    },
    Toggled {
        path: EntryPath,
        open: OpenState,
    },
}

pub struct TreeMutator {
    store: StoreRef,
    tree: Tree,
    selection: Option<EntryPath>,
    validator: NameValidator,
    resolver: ConflictResolver,
    prompter: Arc<dyn Prompter>,
    events: broadcast::Sender<TreeEvent>,
}

impl TreeMutator {
    /// Rebuild the tree from every key in the store.
    ///
    /// Entries whose ancestors have no directory key get those keys written
    /// back, and a selection pointing at a missing file is dropped.
    pub async fn load(
        store: StoreRef,
        validator: NameValidator,
        prompter: Arc<dyn Prompter>,
    ) -> Result<Self> {
        let mut directories: BTreeMap<EntryPath, OpenState> = BTreeMap::new();
        let mut files: BTreeSet<EntryPath> = BTreeSet::new();

        for key in store.keys("").await? {
            match codec::decode(&key) {
                Ok((Category::Directory, path)) => {
                    let value = store.get(&key).await?.unwrap_or_default();
                    _ = directories.insert(path, OpenState::from_stored(&value));
                }
                Ok((Category::File, path)) => {
                    _ = files.insert(path);
                }
                Err(_) => {
                    log_debug!("Skipping non-entry key {key}", key: key.as_str());
                }
            }
        }

        let mut repairs = ChangeSet::new();
        let stored: Vec<EntryPath> = directories.keys().chain(files.iter()).cloned().collect();
        for path in &stored {
            for ancestor in path.ancestors() {
                if !directories.contains_key(&ancestor) {
                    let shown = ancestor.to_string();
                    log_warn!("Restoring missing directory {path}", path: shown.as_str());
                    _ = repairs.set(
                        codec::encode(Category::Directory, &ancestor),
                        OpenState::Open.as_stored(),
                    );
                    _ = directories.insert(ancestor, OpenState::Open);
                }
            }
        }

        let selection = match store.get(CURRENT_FILE_KEY).await? {
            Some(current) if files.contains(&EntryPath::parse(&current)) => {
                Some(EntryPath::parse(&current))
            }
            Some(stale) => {
                log_warn!("Dropping selection of missing file {path}", path: stale.as_str());
                _ = repairs.delete(CURRENT_FILE_KEY).delete(FILE_PATH_NAME_KEY);
                None
            }
            None => None,
        };

        if !repairs.is_empty() {
            repairs.apply(store.as_ref()).await?;
        }

        let mut ordered: Vec<(EntryPath, OpenState)> = directories.into_iter().collect();
        ordered.sort_by(|(a, _), (b, _)| a.depth().cmp(&b.depth()).then_with(|| a.cmp(b)));

        let mut tree = Tree::new();
        for (path, open) in ordered {
            if let (Some(name), Some(parent)) = (path.name(), path.parent()) {
                tree.insert(&parent, Node::directory(name, open))?;
            }
        }
        for path in &files {
            if let (Some(name), Some(parent)) = (path.name(), path.parent()) {
                tree.insert(&parent, Node::file(name))?;
            }
        }

        log_debug!("Loaded {count} entries", count: tree.walk().len());

        let resolver = ConflictResolver::new(validator.clone(), prompter.clone());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            store,
            tree,
            selection,
            validator,
            resolver,
            prompter,
            events,
        })
    }

    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[must_use]
    pub fn store(&self) -> &StoreRef {
        &self.store
    }

    #[must_use]
    pub fn validator(&self) -> &NameValidator {
        &self.validator
    }

    #[must_use]
    pub fn resolver(&self) -> &ConflictResolver {
        &self.resolver
    }

    #[must_use]
    pub fn prompter(&self) -> &Arc<dyn Prompter> {
        &self.prompter
    }

    /// The file currently open, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&EntryPath> {
        self.selection.as_ref()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TreeEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: TreeEvent) {
        // No subscribers is fine
        _ = self.events.send(event);
    }

    pub fn list(&self, dir: &EntryPath) -> Result<Vec<Entry>> {
        self.tree.list(dir)
    }

    fn require(&self, kind: EntryKind, path: &EntryPath) -> Result<()> {
        if self.tree.contains(kind, path) {
            Ok(())
        } else {
            Err(Error::not_found(path))
        }
    }

    fn require_directory(&self, path: &EntryPath) -> Result<()> {
        if self.tree.is_directory(path) {
            Ok(())
        } else {
            Err(Error::not_found(path))
        }
    }

    /// Ask before using a name that shadows a built-in module.
    async fn confirm_reserved(&self, validated: &Validated) -> Result<()> {
        if let Some(warning) = &validated.warning {
            if !self.prompter.request_confirmation(&warning.message()).await {
                return Err(Error::ReservedName(warning.stem.clone()));
            }
        }
        Ok(())
    }

    fn split(path: &EntryPath) -> Result<(EntryPath, String)> {
        match (path.parent(), path.name()) {
            (Some(parent), Some(name)) => Ok((parent, name.to_string())),
            _ => Err(Error::EmptyName),
        }
    }

    /// Create a file at `path`. Extension-less names get the default
    /// extension; the returned path is the one actually written.
    pub async fn create_file(&mut self, path: &EntryPath, content: &str) -> Result<EntryPath> {
        let (parent, name) = Self::split(path)?;
        self.require_directory(&parent)?;

        let validated = self
            .validator
            .validate(&name, &parent, Category::File, true)
            .await?;
        self.confirm_reserved(&validated).await?;
        let target = validated.path_in(&parent);

        let mut changes = ChangeSet::new();
        _ = changes.set(codec::encode(Category::File, &target), content);
        changes.apply(self.store.as_ref()).await?;

        self.tree.insert(&parent, Node::file(validated.name))?;

        let shown = target.to_string();
        log_info!("Created file {path}", path: shown.as_str());
        self.publish(TreeEvent::Created(Entry::file(target.clone())));
        Ok(target)
    }

    /// Create an open, empty directory at `path`.
    pub async fn create_directory(&mut self, path: &EntryPath) -> Result<EntryPath> {
        let (parent, name) = Self::split(path)?;
        self.require_directory(&parent)?;

        let validated = self
            .validator
            .validate(&name, &parent, Category::Directory, false)
            .await?;
        let target = validated.path_in(&parent);

        let mut changes = ChangeSet::new();
        _ = changes.set(
            codec::encode(Category::Directory, &target),
            OpenState::Open.as_stored(),
        );
        changes.apply(self.store.as_ref()).await?;

        self.tree
            .insert(&parent, Node::directory(validated.name, OpenState::Open))?;

        let shown = target.to_string();
        log_info!("Created directory {path}", path: shown.as_str());
        self.publish(TreeEvent::Created(Entry::directory(
            target.clone(),
            OpenState::Open,
        )));
        Ok(target)
    }

    /// Write a file whose name was already approved, e.g. by the conflict
    /// resolver. Only the exact-duplicate rule is checked again.
    pub(crate) async fn insert_file(
        &mut self,
        parent: &EntryPath,
        name: &str,
        content: &str,
    ) -> Result<EntryPath> {
        self.require_directory(parent)?;
        let target = parent.join(name);
        let key = codec::encode(Category::File, &target);
        if self.store.contains(&key).await? {
            return Err(Error::ExactDuplicate(target));
        }

        let mut changes = ChangeSet::new();
        _ = changes.set(key, content);
        changes.apply(self.store.as_ref()).await?;
        self.tree.insert(parent, Node::file(name))?;

        self.publish(TreeEvent::Created(Entry::file(target.clone())));
        Ok(target)
    }

    /// Replace the content of an existing file.
    pub async fn write_content(&mut self, path: &EntryPath, content: &str) -> Result<()> {
        self.require(EntryKind::File, path)?;
        let mut changes = ChangeSet::new();
        _ = changes.set(codec::encode(Category::File, path), content);
        changes.apply(self.store.as_ref()).await
    }

    /// Content of an existing file.
    pub async fn read_content(&self, path: &EntryPath) -> Result<String> {
        self.require(EntryKind::File, path)?;
        self.store
            .get(&codec::encode(Category::File, path))
            .await?
            .ok_or_else(|| Error::not_found(path))
    }

    /// Rename in place. Same rules as creating the new name, including the
    /// global file-name check.
    pub async fn rename(
        &mut self,
        kind: EntryKind,
        path: &EntryPath,
        new_name: &str,
    ) -> Result<EntryPath> {
        self.require(kind, path)?;
        let (parent, name) = Self::split(path)?;
        let canonical = match kind {
            EntryKind::File => canonical_file_name(new_name, self.validator.default_extension()),
            EntryKind::Directory => new_name.to_string(),
        };
        if name == canonical {
            return Ok(path.clone());
        }

        let validated = self
            .validator
            .validate(new_name, &parent, kind.category(), true)
            .await?;
        self.confirm_reserved(&validated).await?;

        let target = validated.path_in(&parent);
        self.relocate(kind, path, &target).await?;
        Ok(target)
    }

    pub async fn move_file(
        &mut self,
        path: &EntryPath,
        destination: &EntryPath,
        on_conflict: OnConflict,
    ) -> Result<MoveOutcome> {
        self.move_entry(EntryKind::File, path, destination, on_conflict)
            .await
    }

    pub async fn move_directory(
        &mut self,
        path: &EntryPath,
        destination: &EntryPath,
        on_conflict: OnConflict,
    ) -> Result<MoveOutcome> {
        self.move_entry(EntryKind::Directory, path, destination, on_conflict)
            .await
    }

    /// Move a file or a whole directory subtree into `destination`.
    pub async fn move_entry(
        &mut self,
        kind: EntryKind,
        path: &EntryPath,
        destination: &EntryPath,
        on_conflict: OnConflict,
    ) -> Result<MoveOutcome> {
        self.require(kind, path)?;
        if kind == EntryKind::Directory && destination.starts_with(path) {
            return Err(Error::SelfOrDescendantMove {
                from: path.clone(),
                destination: destination.clone(),
            });
        }
        self.require_directory(destination)?;

        let (parent, name) = Self::split(path)?;
        if &parent == destination {
            return Ok(MoveOutcome::Unchanged);
        }

        let category = kind.category();
        let target = match self
            .validator
            .validate_move(&name, destination, category)
            .await
        {
            Ok(validated) => validated.path_in(destination),
            Err(Error::ExactDuplicate(_)) if on_conflict == OnConflict::Prompt => {
                match self
                    .resolver
                    .resolve_one(&name, destination, category, false)
                    .await?
                {
                    Some(resolved) => destination.join(&resolved),
                    None => return Ok(MoveOutcome::Cancelled),
                }
            }
            Err(err) => return Err(err),
        };

        self.relocate(kind, path, &target).await?;
        Ok(MoveOutcome::Moved(target))
    }

    /// Rewrite every key of the entry at `from` (and its subtree) to live at
    /// `to`, then relink the tree node.
    async fn relocate(&mut self, kind: EntryKind, from: &EntryPath, to: &EntryPath) -> Result<()> {
        let category = kind.category();
        let own_key = codec::encode(category, from);
        let own_value = self
            .store
            .get(&own_key)
            .await?
            .ok_or_else(|| Error::not_found(from))?;

        let mut rewrites = vec![(own_key, codec::encode(category, to), own_value)];
        if kind == EntryKind::Directory {
            for key in self.store.keys("").await? {
                let Ok((entry_category, path)) = codec::decode(&key) else {
                    continue;
                };
                if !path.is_strictly_under(from) {
                    continue;
                }
                let Some(moved) = path.rebase(from, to) else {
                    continue;
                };
                let value = self.store.get(&key).await?.unwrap_or_default();
                rewrites.push((key, codec::encode(entry_category, &moved), value));
            }
        }

        let written: BTreeSet<&str> = rewrites.iter().map(|(_, new, _)| new.as_str()).collect();
        let mut changes = ChangeSet::new();
        for (_, new_key, value) in &rewrites {
            _ = changes.set(new_key.as_str(), value.as_str());
        }
        for (old_key, _, _) in &rewrites {
            if !written.contains(old_key.as_str()) {
                _ = changes.delete(old_key.as_str());
            }
        }

        let selection = self
            .selection
            .as_ref()
            .and_then(|current| match kind {
                EntryKind::File if current == from => Some(to.clone()),
                EntryKind::Directory if current.is_strictly_under(from) => {
                    current.rebase(from, to)
                }
                EntryKind::Directory => None,
                EntryKind::File => None,
            });
        if let Some(moved) = &selection {
            let value = moved.to_string();
            _ = changes
                .set(CURRENT_FILE_KEY, value.as_str())
                .set(FILE_PATH_NAME_KEY, value.as_str());
        }

        changes.apply(self.store.as_ref()).await?;

        self.tree.relink(kind, from, to)?;
        if selection.is_some() {
            self.selection = selection;
        }

        let (shown_from, shown_to) = (from.to_string(), to.to_string());
        log_info!(
            "Moved {kind} {from} -> {to} ({count} keys)",
            kind: category.tag(),
            from: shown_from.as_str(),
            to: shown_to.as_str(),
            count: rewrites.len()
        );
        self.publish(TreeEvent::Moved {
            kind,
            from: from.clone(),
            to: to.clone(),
        });
        Ok(())
    }

    pub async fn delete_file(&mut self, path: &EntryPath) -> Result<()> {
        self.require(EntryKind::File, path)?;

        let mut changes = ChangeSet::new();
        _ = changes.delete(codec::encode(Category::File, path));
        let clears_selection = self.selection.as_ref() == Some(path);
        if clears_selection {
            _ = changes.delete(CURRENT_FILE_KEY).delete(FILE_PATH_NAME_KEY);
        }
        changes.apply(self.store.as_ref()).await?;

        _ = self.tree.detach(EntryKind::File, path);
        if clears_selection {
            self.selection = None;
        }

        let shown = path.to_string();
        log_info!("Deleted file {path}", path: shown.as_str());
        self.publish(TreeEvent::Deleted {
            kind: EntryKind::File,
            path: path.clone(),
            removed: 1,
        });
        Ok(())
    }

    /// Delete a directory and everything under it. Returns the number of
    /// entries removed, the directory itself included.
    pub async fn delete_directory(&mut self, path: &EntryPath) -> Result<usize> {
        self.require(EntryKind::Directory, path)?;

        let mut keys = vec![codec::encode(Category::Directory, path)];
        for category in [Category::File, Category::Directory] {
            keys.extend(
                self.store
                    .keys(&codec::descendant_prefix(category, path))
                    .await?,
            );
        }

        let mut changes = ChangeSet::new();
        for key in &keys {
            _ = changes.delete(key.as_str());
        }
        let clears_selection = self
            .selection
            .as_ref()
            .is_some_and(|current| current.is_strictly_under(path));
        if clears_selection {
            _ = changes.delete(CURRENT_FILE_KEY).delete(FILE_PATH_NAME_KEY);
        }
        changes.apply(self.store.as_ref()).await?;

        _ = self.tree.detach(EntryKind::Directory, path);
        if clears_selection {
            self.selection = None;
        }

        let shown = path.to_string();
        log_info!("Deleted directory {path} ({count} entries)", path: shown.as_str(), count: keys.len());
        self.publish(TreeEvent::Deleted {
            kind: EntryKind::Directory,
            path: path.clone(),
            removed: keys.len(),
        });
        Ok(keys.len())
    }

    pub async fn summary(&self, path: &EntryPath) -> Result<DirectorySummary> {
        self.require(EntryKind::Directory, path)?;
        let has_files = !self
            .store
            .keys(&codec::descendant_prefix(Category::File, path))
            .await?
            .is_empty();
        let has_directories = !self
            .store
            .keys(&codec::descendant_prefix(Category::Directory, path))
            .await?
            .is_empty();
        Ok(DirectorySummary::from_flags(has_files, has_directories))
    }

    pub async fn set_open_state(&mut self, path: &EntryPath, state: OpenState) -> Result<()> {
        self.require(EntryKind::Directory, path)?;

        let mut changes = ChangeSet::new();
        _ = changes.set(codec::encode(Category::Directory, path), state.as_stored());
        changes.apply(self.store.as_ref()).await?;
        self.tree.set_open(path, state)?;

        self.publish(TreeEvent::Toggled {
            path: path.clone(),
            open: state,
        });
        Ok(())
    }

    /// Flip a directory between open and closed, returning the new state.
    pub async fn toggle(&mut self, path: &EntryPath) -> Result<OpenState> {
        let current = self
            .tree
            .entry(EntryKind::Directory, path)
            .and_then(|entry| entry.open)
            .ok_or_else(|| Error::not_found(path))?;
        let next = current.toggled();
        self.set_open_state(path, next).await?;
        Ok(next)
    }

    /// Point the selection at an existing file.
    pub async fn select(&mut self, path: &EntryPath) -> Result<()> {
        self.require(EntryKind::File, path)?;
        let value = path.to_string();
        let mut changes = ChangeSet::new();
        _ = changes
            .set(CURRENT_FILE_KEY, value.as_str())
            .set(FILE_PATH_NAME_KEY, value.as_str());
        changes.apply(self.store.as_ref()).await?;
        self.selection = Some(path.clone());
        Ok(())
    }
}
