//! A hierarchical file workspace on top of a flat key-value store.
//!
//! Directories exist only as `directory:<path>` keys and files as
//! `file:<path>` keys; [`TreeMutator`] keeps an ordered in-memory tree in
//! step with those keys, and [`Workspace`] layers the editor session on top.

pub mod changes;
pub mod classify;
pub mod codec;
pub mod config;
pub mod conflict;
pub mod error;
pub mod file_store;
pub mod mutator;
pub mod path;
pub mod prompt;
pub mod reserved;
pub mod search;
pub mod store;
pub mod testing;
pub mod tree;
pub mod tree_format;
pub mod validate;
pub mod workspace;

#[cfg(test)]
mod tests;

pub use changes::ChangeSet;
pub use classify::{ContentClassifier, ContentKind, ExtensionClassifier};
pub use codec::Category;
pub use config::WorkspaceConfig;
pub use conflict::{Conflict, ConflictResolver};
pub use error::{Error, Result};
pub use file_store::JsonFileStore;
pub use mutator::{DirectorySummary, MoveOutcome, OnConflict, TreeEvent, TreeMutator};
pub use path::EntryPath;
pub use prompt::{ConfirmAll, DeclineAll, NamePrompt, Prompter};
pub use reserved::{ReservedNameRegistry, ReservedNames};
pub use search::{SearchIndex, Visibility};
pub use store::{KeyValueStore, MemoryStore, StoreRef};
pub use tree::{Entry, EntryKind, OpenState, Tree};
pub use validate::{NameValidator, ReservedNameWarning, Validated};
pub use workspace::{OpenedFile, Upload, UploadReport, Workspace};
