//! Naming rules for new and relocated entries.

use crate::classify::ContentClassifier;
use crate::codec::{self, Category};
use crate::error::{Error, Result};
use crate::path::{EntryPath, SEPARATOR};
use crate::reserved::ReservedNameRegistry;
use crate::store::StoreRef;
use diagnostics::log_debug;
use std::sync::Arc;

/// Extension appended to file names that have none.
pub const DEFAULT_EXTENSION: &str = "grace";

/// Non-fatal outcome: the name shadows a reserved module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedNameWarning {
    pub stem: String,
}

impl ReservedNameWarning {
    /// Text for the confirmation prompt.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "\"{}\" is a built-in module. Are you sure you want to overwrite it? \
             Doing so could cause unpredictable behavior!",
            self.stem
        )
    }
}

/// An approved name, canonicalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub name: String,
    pub warning: Option<ReservedNameWarning>,
}

impl Validated {
    /// Full path of the approved name inside `destination`.
    #[must_use]
    pub fn path_in(&self, destination: &EntryPath) -> EntryPath {
        destination.join(&self.name)
    }
}

#[derive(Clone)]
pub struct NameValidator {
    store: StoreRef,
    classifier: Arc<dyn ContentClassifier>,
    reserved: Arc<dyn ReservedNameRegistry>,
    default_extension: String,
}

impl NameValidator {
    pub fn new(
        store: StoreRef,
        classifier: Arc<dyn ContentClassifier>,
        reserved: Arc<dyn ReservedNameRegistry>,
    ) -> Self {
        Self {
            store,
            classifier,
            reserved,
            default_extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    #[must_use]
    pub fn with_default_extension(mut self, extension: impl Into<String>) -> Self {
        self.default_extension = extension.into();
        self
    }

    #[must_use]
    pub fn default_extension(&self) -> &str {
        &self.default_extension
    }

    /// Check `name` for placement in `destination`, using the default
    /// extension for extension-less file names.
    pub async fn validate(
        &self,
        name: &str,
        destination: &EntryPath,
        category: Category,
        check_global: bool,
    ) -> Result<Validated> {
        let fallback = self.default_extension.clone();
        self.validate_with_fallback(name, destination, category, check_global, &fallback)
            .await
    }

    /// Like [`validate`](Self::validate), with the extension to append taken
    /// from context (e.g. the name being replaced).
    pub async fn validate_with_fallback(
        &self,
        name: &str,
        destination: &EntryPath,
        category: Category,
        check_global: bool,
        fallback_extension: &str,
    ) -> Result<Validated> {
        self.check(name, destination, category, check_global, Some(fallback_extension))
            .await
    }

    /// Check a name that is being carried into `destination` as stored.
    ///
    /// The name is not canonicalized, and a stored file name without an
    /// extension is let through. A stored extension must still be allowed.
    pub async fn validate_move(
        &self,
        name: &str,
        destination: &EntryPath,
        category: Category,
    ) -> Result<Validated> {
        self.check(name, destination, category, false, None).await
    }

    /// `fallback_extension` is `None` when the name keeps its stored form.
    async fn check(
        &self,
        name: &str,
        destination: &EntryPath,
        category: Category,
        check_global: bool,
        fallback_extension: Option<&str>,
    ) -> Result<Validated> {
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        let name = match (category, fallback_extension) {
            (Category::File, Some(fallback)) => canonical_file_name(name, fallback),
            _ => name.to_string(),
        };

        if name.starts_with('.') {
            return Err(Error::LeadingDot(name));
        }

        if name.contains(SEPARATOR) {
            return Err(Error::EmbeddedSeparator(name));
        }

        if category == Category::File {
            match codec::extension(&name) {
                None if fallback_extension.is_none() => {}
                Some(_) if self.classifier.is_allowed(&name) => {}
                extension => {
                    let extension = extension.unwrap_or_default().to_string();
                    return Err(Error::InvalidExtension { name, extension });
                }
            }
        }

        let target = destination.join(&name);
        if self.store.contains(&codec::encode(category, &target)).await? {
            return Err(Error::ExactDuplicate(target));
        }

        if check_global && category == Category::File {
            if let Some(existing) = self.find_file_named(&name).await? {
                return Err(Error::GlobalNameCollision { name, existing });
            }
        }

        let stem = codec::stem(&name);
        let warning = self.reserved.is_reserved(stem).then(|| ReservedNameWarning {
            stem: stem.to_string(),
        });

        Ok(Validated { name, warning })
    }

    /// First file anywhere in the store whose basename is `name`.
    async fn find_file_named(&self, name: &str) -> Result<Option<EntryPath>> {
        for key in self.store.keys(&Category::File.key_prefix()).await? {
            match codec::decode(&key) {
                Ok((_, path)) if path.name() == Some(name) => return Ok(Some(path)),
                Ok(_) => {}
                Err(_) => {
                    log_debug!("Skipping malformed key {key}", key: key.as_str());
                }
            }
        }
        Ok(None)
    }
}

/// Append `fallback` to a file name that carries no extension.
#[must_use]
pub fn canonical_file_name(name: &str, fallback: &str) -> String {
    if codec::extension(name).is_some() || fallback.is_empty() {
        name.to_string()
    } else {
        format!("{name}.{fallback}")
    }
}
