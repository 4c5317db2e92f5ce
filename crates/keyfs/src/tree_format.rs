//! Box-drawing rendering of the workspace tree.
//!
//! ```text
//! /
//! ├─┬ docs/
//! │ └── readme.txt
//! └── notes.txt *
//! ```

use crate::path::EntryPath;
use crate::search::Visibility;
use crate::tree::{EntryKind, Node, OpenState, Tree};

/// What to show.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions<'a> {
    /// Hide the contents of closed directories.
    pub respect_open_state: bool,
    /// Marked with a trailing `*`.
    pub current: Option<&'a EntryPath>,
    /// Entries not visible under the active search are skipped.
    pub visibility: Option<&'a Visibility>,
}

/// Render the subtree rooted at `dir`.
#[must_use]
pub fn render(tree: &Tree, dir: &EntryPath, options: &RenderOptions<'_>) -> String {
    let mut output = String::new();
    if dir.is_root() {
        output.push('/');
    } else {
        output.push_str(&format!("{dir}/"));
    }
    output.push('\n');

    if let Some(children) = tree.children(dir) {
        render_level(&mut output, children, dir, "", options);
    }
    output
}

fn shown<'n>(
    children: &'n [Node],
    parent: &EntryPath,
    options: &RenderOptions<'_>,
) -> Vec<&'n Node> {
    children
        .iter()
        .filter(|node| {
            options
                .visibility
                .is_none_or(|v| v.is_visible(node.kind(), &parent.join(node.name())))
        })
        .collect()
}

fn render_level(
    output: &mut String,
    children: &[Node],
    parent: &EntryPath,
    prefix: &str,
    options: &RenderOptions<'_>,
) {
    let nodes = shown(children, parent, options);
    let count = nodes.len();

    for (index, node) in nodes.into_iter().enumerate() {
        let last = index + 1 == count;
        let path = parent.join(node.name());

        let nested = match node {
            Node::Directory { open, children, .. } => {
                let expanded = !options.respect_open_state || *open == OpenState::Open;
                if expanded && !shown(children, &path, options).is_empty() {
                    Some(children.as_slice())
                } else {
                    None
                }
            }
            Node::File { .. } => None,
        };

        let connector = match (last, nested.is_some()) {
            (true, false) => "└──",
            (false, false) => "├──",
            (true, true) => "└─┬",
            (false, true) => "├─┬",
        };

        output.push_str(prefix);
        output.push_str(connector);
        output.push(' ');
        output.push_str(&label(node, &path, options));
        output.push('\n');

        if let Some(grandchildren) = nested {
            let continuation = if last { ' ' } else { '│' };
            let next_prefix = format!("{prefix}{continuation} ");
            render_level(output, grandchildren, &path, &next_prefix, options);
        }
    }
}

fn label(node: &Node, path: &EntryPath, options: &RenderOptions<'_>) -> String {
    match node {
        Node::Directory { name, open, .. } => match (options.respect_open_state, open) {
            (true, OpenState::Closed) => format!("{name}/ (closed)"),
            _ => format!("{name}/"),
        },
        Node::File { name } if options.current == Some(path) => format!("{name} *"),
        Node::File { name } => name.clone(),
    }
}

/// One line per entry, full paths, directories suffixed with `/`.
#[must_use]
pub fn render_flat(tree: &Tree) -> String {
    tree.walk()
        .iter()
        .map(|entry| match entry.kind {
            EntryKind::Directory => format!("{}/\n", entry.path),
            EntryKind::File => format!("{}\n", entry.path),
        })
        .collect()
}
