use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between path segments in keys and display strings.
pub const SEPARATOR: char = '/';

/// Full path of an entry as an ordered list of name segments.
///
/// The empty path is the workspace root. It is never stored, but is a valid
/// destination and listing target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct EntryPath(Vec<String>);

impl EntryPath {
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a `/`-separated path. Leading, trailing and repeated
    /// separators are ignored, so `"/docs/"` and `"docs"` are the same path.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self(
            path.split(SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    #[must_use]
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self(segments)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The last segment, `None` for the root.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The containing directory, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<EntryPath> {
        if self.is_root() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    #[must_use]
    pub fn join(&self, name: &str) -> EntryPath {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    /// Same parent, different last segment.
    #[must_use]
    pub fn with_name(&self, name: &str) -> EntryPath {
        match self.parent() {
            Some(parent) => parent.join(name),
            None => EntryPath::root().join(name),
        }
    }

    /// True if `prefix` is this path or one of its ancestors.
    #[must_use]
    pub fn starts_with(&self, prefix: &EntryPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// True if `ancestor` is a strict prefix of this path.
    #[must_use]
    pub fn is_strictly_under(&self, ancestor: &EntryPath) -> bool {
        self.0.len() > ancestor.0.len() && self.starts_with(ancestor)
    }

    /// Replace the leading `old` prefix with `new`, keeping the remainder.
    #[must_use]
    pub fn rebase(&self, old: &EntryPath, new: &EntryPath) -> Option<EntryPath> {
        if !self.starts_with(old) {
            return None;
        }
        let mut segments = new.0.clone();
        segments.extend_from_slice(&self.0[old.0.len()..]);
        Some(Self(segments))
    }

    /// Proper ancestors excluding the root, shallowest first.
    pub fn ancestors(&self) -> impl Iterator<Item = EntryPath> + '_ {
        (1..self.0.len()).map(|len| Self(self.0[..len].to_vec()))
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            if !first {
                write!(f, "{SEPARATOR}")?;
            }
            first = false;
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl From<&str> for EntryPath {
    fn from(path: &str) -> Self {
        EntryPath::parse(path)
    }
}

impl From<String> for EntryPath {
    fn from(path: String) -> Self {
        EntryPath::parse(&path)
    }
}

impl From<EntryPath> for String {
    fn from(path: EntryPath) -> Self {
        path.to_string()
    }
}
