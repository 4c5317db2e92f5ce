//! Substring filtering of the tree.

use crate::path::EntryPath;
use crate::tree::{EntryKind, Node, Tree};
use std::collections::HashSet;

/// Which entries a front end should show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    All,
    Only(HashSet<(EntryKind, EntryPath)>),
}

impl Visibility {
    #[must_use]
    pub fn is_visible(&self, kind: EntryKind, path: &EntryPath) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Only(visible) => visible.contains(&(kind, path.clone())),
        }
    }
}

/// Compute visibility of every entry for `query`.
///
/// A file is visible when its name contains `query`; a directory when its
/// own name or anything below it matches. Matching is case-sensitive and an
/// empty query shows everything.
#[must_use]
pub fn visibility(tree: &Tree, query: &str) -> Visibility {
    if query.is_empty() {
        return Visibility::All;
    }
    let mut visible = HashSet::new();
    if let Some(children) = tree.children(&EntryPath::root()) {
        for node in children {
            _ = mark(node, &EntryPath::root(), query, &mut visible);
        }
    }
    Visibility::Only(visible)
}

fn mark(
    node: &Node,
    parent: &EntryPath,
    query: &str,
    visible: &mut HashSet<(EntryKind, EntryPath)>,
) -> bool {
    let path = parent.join(node.name());
    let mut matched = node.name().contains(query);
    if let Node::Directory { children, .. } = node {
        for child in children {
            // Every child is visited so nested matches get marked too
            matched |= mark(child, &path, query, visible);
        }
    }
    if matched {
        _ = visible.insert((node.kind(), path));
    }
    matched
}

/// Remembers the active query so it can be re-applied after mutations.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    query: String,
    visibility: Visibility,
}

impl SearchIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&mut self, tree: &Tree, query: &str) -> &Visibility {
        self.query = query.to_string();
        self.refresh(tree)
    }

    /// Recompute for the current query against a changed tree.
    pub fn refresh(&mut self, tree: &Tree) -> &Visibility {
        self.visibility = visibility(tree, &self.query);
        &self.visibility
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.visibility = Visibility::All;
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    #[must_use]
    pub fn is_visible(&self, kind: EntryKind, path: &EntryPath) -> bool {
        self.visibility.is_visible(kind, path)
    }
}
