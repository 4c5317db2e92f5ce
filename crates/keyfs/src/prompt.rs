use async_trait::async_trait;

/// A request for a replacement name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePrompt {
    pub title: String,
    pub message: String,
    /// Hint shown in the empty input.
    pub placeholder: String,
    /// Feedback from the previous attempt, if it was rejected.
    pub error: Option<String>,
}

impl NamePrompt {
    #[must_use]
    pub fn conflict(name: &str) -> Self {
        Self {
            title: format!("Name Conflict: {name}"),
            message: format!(
                "The name \"{name}\" is already taken. Please enter a new name for this item:"
            ),
            placeholder: "A different name...".to_string(),
            error: None,
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Interaction with whoever is driving the workspace.
///
/// Implementations may block on a terminal or a dialog; callers only ever
/// await one request at a time.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// `None` means the user cancelled.
    async fn request_name(&self, prompt: &NamePrompt) -> Option<String>;

    async fn request_confirmation(&self, message: &str) -> bool;
}

/// Answers every name request with a cancel and every confirmation with
/// "no". Used for non-interactive sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclineAll;

#[async_trait]
impl Prompter for DeclineAll {
    async fn request_name(&self, _prompt: &NamePrompt) -> Option<String> {
        None
    }

    async fn request_confirmation(&self, _message: &str) -> bool {
        false
    }
}

/// Accepts every confirmation and cancels every name request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmAll;

#[async_trait]
impl Prompter for ConfirmAll {
    async fn request_name(&self, _prompt: &NamePrompt) -> Option<String> {
        None
    }

    async fn request_confirmation(&self, _message: &str) -> bool {
        true
    }
}
