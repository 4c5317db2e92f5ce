mod mutator;
mod workspace;

use crate::classify::ExtensionClassifier;
use crate::mutator::TreeMutator;
use crate::prompt::Prompter;
use crate::reserved::ReservedNames;
use crate::store::{MemoryStore, StoreRef};
use crate::testing::ScriptedPrompter;
use crate::validate::NameValidator;
use std::sync::Arc;

pub(crate) fn validator_for(store: StoreRef) -> NameValidator {
    NameValidator::new(
        store,
        Arc::new(ExtensionClassifier),
        Arc::new(ReservedNames::builtin()),
    )
}

/// Mutator over `store` answering prompts from `prompter`.
pub(crate) async fn mutator_with(
    store: StoreRef,
    prompter: Arc<dyn Prompter>,
) -> TreeMutator {
    TreeMutator::load(store.clone(), validator_for(store), prompter)
        .await
        .unwrap()
}

/// Mutator over a fresh store with no scripted answers.
pub(crate) async fn new_mutator() -> (MemoryStore, TreeMutator) {
    let store = MemoryStore::new();
    let mutator = mutator_with(Arc::new(store.clone()), Arc::new(ScriptedPrompter::new())).await;
    (store, mutator)
}
