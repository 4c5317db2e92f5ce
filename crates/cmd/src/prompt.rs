//! Terminal answers for naming and confirmation questions.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use diagnostics::log_debug;
use keyfs::{NamePrompt, Prompter};

/// Asks on stderr and reads one line from stdin per question.
///
/// End of input or an empty line cancels a rename; only `y` or `yes`
/// confirms.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

async fn ask(question: String) -> Option<String> {
    tokio::task::spawn_blocking(move || {
        let mut stderr = io::stderr().lock();
        _ = write!(stderr, "{question}");
        _ = stderr.flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    })
    .await
    .ok()
    .flatten()
}

fn name_question(prompt: &NamePrompt) -> String {
    let mut question = format!("{}\n{}\n", prompt.title, prompt.message);
    if let Some(error) = &prompt.error {
        question.push_str(&format!("({error})\n"));
    }
    question.push_str(&format!("[{}] > ", prompt.placeholder));
    question
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn request_name(&self, prompt: &NamePrompt) -> Option<String> {
        let answer = ask(name_question(prompt)).await?;
        if answer.is_empty() {
            log_debug!("Name prompt cancelled");
            return None;
        }
        Some(answer)
    }

    async fn request_confirmation(&self, message: &str) -> bool {
        ask(format!("{message} [y/N] "))
            .await
            .is_some_and(|answer| is_yes(&answer))
    }
}
