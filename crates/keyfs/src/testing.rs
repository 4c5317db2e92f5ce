//! Test doubles for the store and prompt seams.

use crate::error::{Error, Result};
use crate::prompt::{NamePrompt, Prompter};
use crate::store::{KeyValueStore, MemoryStore};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Wraps a [`MemoryStore`] and injects a single write or flush failure.
///
/// After the injected failure the store behaves normally again, so rollback
/// writes go through.
pub struct FailingStore {
    inner: MemoryStore,
    writes_before_failure: Option<usize>,
    writes: AtomicUsize,
    fail_flush: AtomicBool,
    tripped: AtomicBool,
}

impl FailingStore {
    #[must_use]
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            writes_before_failure: None,
            writes: AtomicUsize::new(0),
            fail_flush: AtomicBool::new(false),
            tripped: AtomicBool::new(false),
        }
    }

    /// Let `count` writes succeed and fail the next one.
    #[must_use]
    pub fn fail_after_writes(mut self, count: usize) -> Self {
        self.writes_before_failure = Some(count);
        self
    }

    /// Fail the next flush.
    #[must_use]
    pub fn fail_flush(self) -> Self {
        self.fail_flush.store(true, Ordering::SeqCst);
        self
    }

    fn check_write(&self) -> Result<()> {
        let Some(limit) = self.writes_before_failure else {
            return Ok(());
        };
        let done = self.writes.fetch_add(1, Ordering::SeqCst);
        if done == limit && !self.tripped.swap(true, Ordering::SeqCst) {
            return Err(Error::Store("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_write()?;
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_write()?;
        self.inner.delete(key).await
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.keys(prefix).await
    }

    async fn flush(&self) -> Result<()> {
        if self.fail_flush.swap(false, Ordering::SeqCst) {
            return Err(Error::Store("injected flush failure".to_string()));
        }
        self.inner.flush().await
    }
}

/// Prompter that replays canned answers and records what it was asked.
///
/// When the script runs out, name requests cancel and confirmations decline.
#[derive(Default)]
pub struct ScriptedPrompter {
    names: Mutex<VecDeque<Option<String>>>,
    confirmations: Mutex<VecDeque<bool>>,
    name_prompts: Mutex<Vec<NamePrompt>>,
    confirmation_prompts: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer to the next name request.
    #[must_use]
    pub fn answer(self, name: &str) -> Self {
        self.push_name(Some(name.to_string()));
        self
    }

    /// Queue a cancel for the next name request.
    #[must_use]
    pub fn cancel(self) -> Self {
        self.push_name(None);
        self
    }

    #[must_use]
    pub fn confirm(self, accept: bool) -> Self {
        if let Ok(mut queue) = self.confirmations.lock() {
            queue.push_back(accept);
        }
        self
    }

    fn push_name(&self, answer: Option<String>) {
        if let Ok(mut queue) = self.names.lock() {
            queue.push_back(answer);
        }
    }

    /// Every name prompt shown so far.
    #[must_use]
    pub fn name_prompts(&self) -> Vec<NamePrompt> {
        self.name_prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    /// Every confirmation message shown so far.
    #[must_use]
    pub fn confirmation_prompts(&self) -> Vec<String> {
        self.confirmation_prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn request_name(&self, prompt: &NamePrompt) -> Option<String> {
        if let Ok(mut prompts) = self.name_prompts.lock() {
            prompts.push(prompt.clone());
        }
        self.names
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .flatten()
    }

    async fn request_confirmation(&self, message: &str) -> bool {
        if let Ok(mut prompts) = self.confirmation_prompts.lock() {
            prompts.push(message.to_string());
        }
        self.confirmations
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or(false)
    }
}
