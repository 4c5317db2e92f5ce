//! Interactive resolution of naming conflicts, one item at a time.

use crate::codec::{self, Category};
use crate::error::{Error, Result};
use crate::path::EntryPath;
use crate::prompt::{NamePrompt, Prompter};
use crate::validate::NameValidator;
use diagnostics::{log_debug, log_info};
use std::sync::Arc;

const EMPTY_CANDIDATE: &str = "You need to enter a new name!";

/// Why a batch item needs a new name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// The name is already in use.
    Taken,
    /// The name breaks a naming rule; the message is shown with the first prompt.
    Rejected(String),
}

impl Conflict {
    fn prompt(&self, name: &str) -> NamePrompt {
        match self {
            Conflict::Taken => NamePrompt::conflict(name),
            Conflict::Rejected(reason) => NamePrompt::conflict(name).with_error(reason.as_str()),
        }
    }
}

#[derive(Clone)]
pub struct ConflictResolver {
    validator: NameValidator,
    prompter: Arc<dyn Prompter>,
}

impl ConflictResolver {
    pub fn new(validator: NameValidator, prompter: Arc<dyn Prompter>) -> Self {
        Self {
            validator,
            prompter,
        }
    }

    /// Ask for a replacement for `name` until the user submits a valid one
    /// or cancels.
    ///
    /// Returns the canonical replacement name, or `None` on cancel. Rule
    /// violations are shown back to the user; only store failures escape.
    pub async fn resolve_one(
        &self,
        name: &str,
        destination: &EntryPath,
        category: Category,
        check_global: bool,
    ) -> Result<Option<String>> {
        self.resolve_from(name, destination, category, check_global, NamePrompt::conflict(name))
            .await
    }

    async fn resolve_from(
        &self,
        name: &str,
        destination: &EntryPath,
        category: Category,
        check_global: bool,
        mut prompt: NamePrompt,
    ) -> Result<Option<String>> {
        let fallback = codec::extension(name)
            .filter(|ext| !ext.is_empty())
            .unwrap_or(self.validator.default_extension())
            .to_string();

        loop {
            let Some(candidate) = self.prompter.request_name(&prompt).await else {
                log_debug!("Conflict for {name} cancelled", name: name);
                return Ok(None);
            };

            if candidate.is_empty() {
                prompt = prompt.with_error(EMPTY_CANDIDATE);
                continue;
            }

            let validated = match self
                .validator
                .validate_with_fallback(&candidate, destination, category, check_global, &fallback)
                .await
            {
                Ok(validated) => validated,
                Err(err) if err.is_name_rule() => {
                    prompt = prompt.with_error(err.to_string());
                    continue;
                }
                Err(err) => return Err(err),
            };

            if let Some(warning) = validated.warning.as_ref().filter(|_| check_global) {
                if !self.prompter.request_confirmation(&warning.message()).await {
                    let declined = Error::ReservedName(warning.stem.clone());
                    prompt = prompt.with_error(declined.to_string());
                    continue;
                }
            }

            log_info!("Resolved conflict {name} -> {resolved}", name: name, resolved: validated.name.as_str());
            return Ok(Some(validated.name));
        }
    }

    /// Resolve every flagged name in order; unflagged names pass through.
    ///
    /// Item `i` is settled before item `i + 1` is looked at. A cancelled item
    /// becomes `None` and the batch carries on.
    pub async fn resolve_batch(
        &self,
        names: &[String],
        conflicts: &[bool],
        destination: &EntryPath,
        category: Category,
    ) -> Result<Vec<Option<String>>> {
        let reasons: Vec<Option<Conflict>> = (0..names.len())
            .map(|index| {
                conflicts
                    .get(index)
                    .copied()
                    .unwrap_or(false)
                    .then_some(Conflict::Taken)
            })
            .collect();
        self.resolve_conflicts(names, &reasons, destination, category)
            .await
    }

    /// [`resolve_batch`](Self::resolve_batch) with a reason per flagged item,
    /// so a rule violation is explained before the first answer.
    pub async fn resolve_conflicts(
        &self,
        names: &[String],
        conflicts: &[Option<Conflict>],
        destination: &EntryPath,
        category: Category,
    ) -> Result<Vec<Option<String>>> {
        let mut resolved = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            match conflicts.get(index).and_then(Option::as_ref) {
                Some(conflict) => {
                    let prompt = conflict.prompt(name);
                    resolved.push(
                        self.resolve_from(name, destination, category, true, prompt)
                            .await?,
                    );
                }
                None => resolved.push(Some(name.clone())),
            }
        }
        Ok(resolved)
    }

    /// [`resolve_batch`](Self::resolve_batch), handing the final list to `then`.
    pub async fn resolve_batch_then<F, T>(
        &self,
        names: &[String],
        conflicts: &[bool],
        destination: &EntryPath,
        category: Category,
        then: F,
    ) -> Result<T>
    where
        F: FnOnce(Vec<Option<String>>) -> T + Send,
    {
        let resolved = self
            .resolve_batch(names, conflicts, destination, category)
            .await?;
        Ok(then(resolved))
    }
}
