use crate::path::EntryPath;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by keyfs operations.
///
/// The name-rule variants (`EmptyName` through `ReservedName`) are meant for
/// the user to correct; see [`Error::is_name_rule`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Malformed store key: {0}")]
    MalformedKey(String),

    #[error("You need to enter a name!")]
    EmptyName,

    #[error("Names cannot begin with a dot.")]
    LeadingDot(String),

    #[error("Names cannot contain slashes.")]
    EmbeddedSeparator(String),

    #[error("\"{extension}\" is not a supported extension.")]
    InvalidExtension { name: String, extension: String },

    #[error("That name is already taken.")]
    ExactDuplicate(EntryPath),

    #[error("That file already exists in another folder!")]
    GlobalNameCollision { name: String, existing: EntryPath },

    #[error("\"{0}\" is a built-in module.")]
    ReservedName(String),

    #[error("Cannot move {from} into itself or one of its descendants ({destination})")]
    SelfOrDescendantMove {
        from: EntryPath,
        destination: EntryPath,
    },

    #[error("Path not found: {0}")]
    NotFound(EntryPath),

    #[error("Not a file: {0}")]
    NotAFile(EntryPath),

    #[error("Not a directory: {0}")]
    NotADirectory(EntryPath),

    #[error("No file is currently open")]
    NoCurrentFile,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl Error {
    pub fn not_found(path: &EntryPath) -> Self {
        Error::NotFound(path.clone())
    }

    pub fn not_a_directory(path: &EntryPath) -> Self {
        Error::NotADirectory(path.clone())
    }

    pub fn not_a_file(path: &EntryPath) -> Self {
        Error::NotAFile(path.clone())
    }

    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        Error::Store(err.to_string())
    }

    /// True for violations of the naming rules, which are reported back to
    /// the user for correction instead of aborting a batch.
    #[must_use]
    pub fn is_name_rule(&self) -> bool {
        matches!(
            self,
            Error::EmptyName
                | Error::LeadingDot(_)
                | Error::EmbeddedSeparator(_)
                | Error::InvalidExtension { .. }
                | Error::ExactDuplicate(_)
                | Error::GlobalNameCollision { .. }
                | Error::ReservedName(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Store(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Store(err.to_string())
    }
}
