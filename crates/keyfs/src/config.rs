use crate::classify::{ContentClassifier, ExtensionClassifier};
use crate::error::{Error, Result};
use crate::path::SEPARATOR;
use crate::reserved::{DEFAULT_RESERVED, ReservedNames};
use crate::validate::{DEFAULT_EXTENSION, canonical_file_name};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_WELCOME_FILE: &str = "Welcome.grace";
const DEFAULT_WELCOME_CONTENT: &str = "// Welcome to the Grace Web Editor!\n";

/// Per-workspace settings, read from JSON.
///
/// Every field is optional in the file; missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Appended to file names created without an extension
    pub default_extension: String,
    /// Stems that trigger a confirmation before use
    pub reserved_names: Vec<String>,
    /// Seeded when the store holds no files. Empty disables seeding.
    pub welcome_file: String,
    pub welcome_content: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            default_extension: DEFAULT_EXTENSION.to_string(),
            reserved_names: DEFAULT_RESERVED.iter().map(ToString::to_string).collect(),
            welcome_file: DEFAULT_WELCOME_FILE.to_string(),
            welcome_content: DEFAULT_WELCOME_CONTENT.to_string(),
        }
    }
}

impl WorkspaceConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| Error::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<()> {
        let extension = &self.default_extension;
        if extension.is_empty() || extension.starts_with('.') || extension.contains(SEPARATOR) {
            return Err(Error::Config(format!(
                "default_extension must be a bare extension: {extension:?}"
            )));
        }
        if !ExtensionClassifier.is_allowed(&format!("file.{extension}")) {
            return Err(Error::Config(format!(
                "default_extension is not a supported extension: {extension}"
            )));
        }

        if !self.welcome_file.is_empty() {
            let name = canonical_file_name(&self.welcome_file, extension);
            if name.starts_with('.')
                || name.contains(SEPARATOR)
                || !ExtensionClassifier.is_allowed(&name)
            {
                return Err(Error::Config(format!(
                    "welcome_file must be a top-level file name with a supported extension: {}",
                    self.welcome_file
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn reserved(&self) -> ReservedNames {
        ReservedNames::new(self.reserved_names.iter().cloned())
    }
}
