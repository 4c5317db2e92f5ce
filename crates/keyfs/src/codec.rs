//! Mapping between `(category, path)` pairs and flat store keys.
//!
//! Keys look like `file:docs/readme.txt` and `directory:docs`. The layout is
//! shared with existing stores and must not change.

use crate::error::{Error, Result};
use crate::path::{EntryPath, SEPARATOR};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key holding the full path of the open file.
pub const CURRENT_FILE_KEY: &str = "currentFile";

/// Mirror of [`CURRENT_FILE_KEY`] read by the editing collaborator.
pub const FILE_PATH_NAME_KEY: &str = "filePathName";

const TAG_SEPARATOR: char = ':';

/// Key namespace of an entry. Files and directories never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    File,
    Directory,
}

impl Category {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Category::File => "file",
            Category::Directory => "directory",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "file" => Some(Category::File),
            "directory" => Some(Category::Directory),
            _ => None,
        }
    }

    /// Prefix shared by every key of this category.
    #[must_use]
    pub fn key_prefix(self) -> String {
        format!("{}{TAG_SEPARATOR}", self.tag())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[must_use]
pub fn encode(category: Category, path: &EntryPath) -> String {
    format!("{}{TAG_SEPARATOR}{path}", category.tag())
}

pub fn decode(key: &str) -> Result<(Category, EntryPath)> {
    let (tag, rest) = key
        .split_once(TAG_SEPARATOR)
        .ok_or_else(|| Error::MalformedKey(key.to_string()))?;
    let category = Category::from_tag(tag).ok_or_else(|| Error::MalformedKey(key.to_string()))?;
    let path = EntryPath::parse(rest);
    if path.is_root() {
        return Err(Error::MalformedKey(key.to_string()));
    }
    Ok((category, path))
}

/// Prefix matching every key strictly under `dir` in `category`.
#[must_use]
pub fn descendant_prefix(category: Category, dir: &EntryPath) -> String {
    if dir.is_root() {
        return category.key_prefix();
    }
    format!("{}{SEPARATOR}", encode(category, dir))
}

/// Last segment of a `/`-separated path.
#[must_use]
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(index) => &trimmed[index + 1..],
        None => trimmed,
    }
}

/// Everything before the last segment, `""` for top-level names.
#[must_use]
pub fn dirname(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(index) => &trimmed[..index],
        None => "",
    }
}

/// Extension of the last segment without the dot.
///
/// A dot in first position does not start an extension, so `.hidden` has
/// none, while `notes.` has an empty one.
#[must_use]
pub fn extension(name: &str) -> Option<&str> {
    let base = basename(name);
    match base.rfind('.') {
        Some(0) | None => None,
        Some(index) => Some(&base[index + 1..]),
    }
}

/// Last segment with its extension removed.
#[must_use]
pub fn stem(name: &str) -> &str {
    let base = basename(name);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(index) => &base[..index],
    }
}
