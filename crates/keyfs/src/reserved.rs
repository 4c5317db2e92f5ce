use std::collections::BTreeSet;

/// Names that shadow something built into the surrounding environment.
pub trait ReservedNameRegistry: Send + Sync {
    /// `stem` is a file name with its extension removed.
    fn is_reserved(&self, stem: &str) -> bool;
}

/// Modules bundled with the runtime the workspace feeds.
pub const DEFAULT_RESERVED: &[&str] = &[
    "collections",
    "dom",
    "gUnit",
    "graphix",
    "io",
    "math",
    "mirrors",
    "objectdraw",
    "random",
    "sys",
    "timer",
    "turtle",
    "unicode",
    "util",
];

/// Registry backed by a fixed set of names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservedNames {
    names: BTreeSet<String>,
}

impl ReservedNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn builtin() -> Self {
        Self::new(DEFAULT_RESERVED.iter().copied())
    }
}

impl ReservedNameRegistry for ReservedNames {
    fn is_reserved(&self, stem: &str) -> bool {
        self.names.contains(stem)
    }
}
