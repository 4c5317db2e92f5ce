//! All-or-nothing application of multi-key updates.
//!
//! The store has no transactions, so a change set remembers the previous
//! value of every key it touches and puts them back if a later write or the
//! final flush fails.

use crate::error::Result;
use crate::store::KeyValueStore;
use diagnostics::{log_debug, log_warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Set(String, String),
    Delete(String),
}

impl StoreOp {
    fn key(&self) -> &str {
        match self {
            StoreOp::Set(key, _) | StoreOp::Delete(key) => key,
        }
    }
}

/// Ordered list of writes applied as a unit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    ops: Vec<StoreOp>,
}

impl ChangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.ops.push(StoreOp::Set(key.into(), value.into()));
        self
    }

    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.ops.push(StoreOp::Delete(key.into()));
        self
    }

    #[must_use]
    pub fn ops(&self) -> &[StoreOp] {
        &self.ops
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Apply every op, then flush. On failure the keys already written are
    /// restored in reverse order and the original error is returned.
    pub async fn apply(&self, store: &dyn KeyValueStore) -> Result<()> {
        let mut undo: Vec<(String, Option<String>)> = Vec::with_capacity(self.ops.len());

        for op in &self.ops {
            let result = Self::apply_one(store, op).await;

            match result {
                Ok(previous) => undo.push((op.key().to_string(), previous)),
                Err(err) => {
                    Self::rollback(store, undo).await;
                    return Err(err);
                }
            }
        }

        if let Err(err) = store.flush().await {
            Self::rollback(store, undo).await;
            return Err(err);
        }

        log_debug!("Applied change set with {count} ops", count: self.ops.len());
        Ok(())
    }

    async fn apply_one(store: &dyn KeyValueStore, op: &StoreOp) -> Result<Option<String>> {
        let previous = store.get(op.key()).await?;
        match op {
            StoreOp::Set(key, value) => store.set(key, value).await?,
            StoreOp::Delete(key) => store.delete(key).await?,
        }
        Ok(previous)
    }

    async fn rollback(store: &dyn KeyValueStore, undo: Vec<(String, Option<String>)>) {
        log_warn!("Rolling back {count} store writes", count: undo.len());

        for (key, previous) in undo.into_iter().rev() {
            let restored = match previous {
                Some(value) => store.set(&key, &value).await,
                None => store.delete(&key).await,
            };
            if let Err(err) = restored {
                let reason = err.to_string();
                log_warn!("Could not restore {key}: {reason}", key: key.as_str(), reason: reason.as_str());
            }
        }
    }
}
