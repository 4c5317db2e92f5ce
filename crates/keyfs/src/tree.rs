//! In-memory view of the workspace hierarchy.
//!
//! The store only knows flat keys; this tree is the ordered structure the
//! presentation layer renders. File content stays in the store.

use crate::codec::Category;
use crate::error::{Error, Result};
use crate::path::EntryPath;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    #[must_use]
    pub fn category(self) -> Category {
        match self {
            EntryKind::File => Category::File,
            EntryKind::Directory => Category::Directory,
        }
    }
}

impl From<Category> for EntryKind {
    fn from(category: Category) -> Self {
        match category {
            Category::File => EntryKind::File,
            Category::Directory => EntryKind::Directory,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category().tag())
    }
}

/// Expansion state of a directory, persisted as the directory key's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenState {
    Open,
    Closed,
}

impl OpenState {
    /// Only the exact marker `"open"` means open; `""` and `"closed"` do not.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value == "open" {
            OpenState::Open
        } else {
            OpenState::Closed
        }
    }

    #[must_use]
    pub fn as_stored(self) -> &'static str {
        match self {
            OpenState::Open => "open",
            OpenState::Closed => "closed",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            OpenState::Open => OpenState::Closed,
            OpenState::Closed => OpenState::Open,
        }
    }
}

/// Public description of one tree entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub kind: EntryKind,
    pub path: EntryPath,
    /// Directories only.
    pub open: Option<OpenState>,
}

impl Entry {
    #[must_use]
    pub fn file(path: EntryPath) -> Self {
        Self {
            kind: EntryKind::File,
            path,
            open: None,
        }
    }

    #[must_use]
    pub fn directory(path: EntryPath, open: OpenState) -> Self {
        Self {
            kind: EntryKind::Directory,
            path,
            open: Some(open),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.path.name().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File {
        name: String,
    },
    Directory {
        name: String,
        open: OpenState,
        children: Vec<Node>,
    },
}

impl Node {
    #[must_use]
    pub fn file(name: impl Into<String>) -> Self {
        Node::File { name: name.into() }
    }

    #[must_use]
    pub fn directory(name: impl Into<String>, open: OpenState) -> Self {
        Node::Directory {
            name: name.into(),
            open,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Node::File { name } | Node::Directory { name, .. } => name,
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntryKind {
        match self {
            Node::File { .. } => EntryKind::File,
            Node::Directory { .. } => EntryKind::Directory,
        }
    }

    fn set_name(&mut self, new_name: &str) {
        match self {
            Node::File { name } | Node::Directory { name, .. } => *name = new_name.to_string(),
        }
    }

    fn entry(&self, parent: &EntryPath) -> Entry {
        let path = parent.join(self.name());
        match self {
            Node::File { .. } => Entry::file(path),
            Node::Directory { open, .. } => Entry::directory(path, *open),
        }
    }

    /// Number of entries in this subtree, the node itself included.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Node::File { .. } => 1,
            Node::Directory { children, .. } => 1 + children.iter().map(Node::count).sum::<usize>(),
        }
    }
}

/// Where `node` belongs among `siblings`.
///
/// A file goes before the first sibling with a greater name; a directory
/// before the first sibling with a greater name or that is a file.
fn insertion_index(siblings: &[Node], node: &Node) -> usize {
    let name = node.name();
    let is_directory = node.kind() == EntryKind::Directory;
    siblings
        .iter()
        .position(|sibling| {
            sibling.name() > name || (is_directory && sibling.kind() == EntryKind::File)
        })
        .unwrap_or(siblings.len())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    root: Vec<Node>,
}

impl Tree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Ordered children of `dir` (the root when `dir` is empty).
    #[must_use]
    pub fn children(&self, dir: &EntryPath) -> Option<&[Node]> {
        let mut level = &self.root;
        for segment in dir.segments() {
            level = match find_in(level, EntryKind::Directory, segment)? {
                Node::Directory { children, .. } => children,
                Node::File { .. } => return None,
            };
        }
        Some(level)
    }

    fn children_mut(&mut self, dir: &EntryPath) -> Option<&mut Vec<Node>> {
        let mut level = &mut self.root;
        for segment in dir.segments() {
            let index = level
                .iter()
                .position(|n| n.kind() == EntryKind::Directory && n.name() == segment)?;
            level = match &mut level[index] {
                Node::Directory { children, .. } => children,
                Node::File { .. } => return None,
            };
        }
        Some(level)
    }

    #[must_use]
    pub fn find(&self, kind: EntryKind, path: &EntryPath) -> Option<&Node> {
        let name = path.name()?;
        let parent = path.parent()?;
        find_in(self.children(&parent)?, kind, name)
    }

    #[must_use]
    pub fn contains(&self, kind: EntryKind, path: &EntryPath) -> bool {
        self.find(kind, path).is_some()
    }

    /// True for the root and for every directory in the tree.
    #[must_use]
    pub fn is_directory(&self, path: &EntryPath) -> bool {
        path.is_root() || self.contains(EntryKind::Directory, path)
    }

    #[must_use]
    pub fn entry(&self, kind: EntryKind, path: &EntryPath) -> Option<Entry> {
        let parent = path.parent()?;
        self.find(kind, path).map(|node| node.entry(&parent))
    }

    /// Insert `node` under `parent` following the sibling ordering rule.
    pub fn insert(&mut self, parent: &EntryPath, node: Node) -> Result<()> {
        let siblings = self
            .children_mut(parent)
            .ok_or_else(|| Error::not_found(parent))?;
        let index = insertion_index(siblings, &node);
        siblings.insert(index, node);
        Ok(())
    }

    /// Remove and return the node (with its subtree) at `path`.
    pub fn detach(&mut self, kind: EntryKind, path: &EntryPath) -> Option<Node> {
        let name = path.name()?.to_string();
        let siblings = self.children_mut(&path.parent()?)?;
        let index = siblings
            .iter()
            .position(|n| n.kind() == kind && n.name() == name)?;
        Some(siblings.remove(index))
    }

    /// Detach the node at `from` and insert it, renamed, at `to`.
    pub fn relink(&mut self, kind: EntryKind, from: &EntryPath, to: &EntryPath) -> Result<()> {
        let new_name = to.name().ok_or_else(|| Error::not_found(to))?;
        let new_parent = to.parent().ok_or_else(|| Error::not_found(to))?;
        if !self.is_directory(&new_parent) {
            return Err(Error::not_found(&new_parent));
        }
        let mut node = self.detach(kind, from).ok_or_else(|| Error::not_found(from))?;
        node.set_name(new_name);
        self.insert(&new_parent, node)
    }

    pub fn set_open(&mut self, path: &EntryPath, state: OpenState) -> Result<()> {
        let name = path.name().ok_or_else(|| Error::not_a_directory(path))?;
        let parent = path.parent().ok_or_else(|| Error::not_a_directory(path))?;
        let siblings = self
            .children_mut(&parent)
            .ok_or_else(|| Error::not_found(path))?;
        match siblings
            .iter_mut()
            .find(|n| n.kind() == EntryKind::Directory && n.name() == name)
        {
            Some(Node::Directory { open, .. }) => {
                *open = state;
                Ok(())
            }
            _ => Err(Error::not_found(path)),
        }
    }

    /// Entries directly inside `dir`, in display order.
    pub fn list(&self, dir: &EntryPath) -> Result<Vec<Entry>> {
        let children = self.children(dir).ok_or_else(|| Error::not_found(dir))?;
        Ok(children.iter().map(|node| node.entry(dir)).collect())
    }

    /// Every entry, depth first, in display order.
    #[must_use]
    pub fn walk(&self) -> Vec<Entry> {
        let mut out = Vec::new();
        walk_into(&self.root, &EntryPath::root(), &mut out);
        out
    }

    /// Every entry strictly under `dir`, depth first.
    pub fn descendants(&self, dir: &EntryPath) -> Result<Vec<Entry>> {
        let children = self.children(dir).ok_or_else(|| Error::not_found(dir))?;
        let mut out = Vec::new();
        walk_into(children, dir, &mut out);
        Ok(out)
    }
}

fn find_in<'a>(level: &'a [Node], kind: EntryKind, name: &str) -> Option<&'a Node> {
    level.iter().find(|n| n.kind() == kind && n.name() == name)
}

fn walk_into(level: &[Node], parent: &EntryPath, out: &mut Vec<Entry>) {
    for node in level {
        let entry = node.entry(parent);
        if let Node::Directory { children, .. } = node {
            let path = entry.path.clone();
            out.push(entry);
            walk_into(children, &path, out);
        } else {
            out.push(entry);
        }
    }
}
