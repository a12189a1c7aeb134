//! Operator confirmations.
//!
//! Stage gates and the `manual` install strategy are the only points where a
//! run waits on a human. Both go through [`Prompt`] so the orchestrator can be
//! driven non-interactively (`--yes`) or scripted in tests.
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input};

/// Source of yes/no answers and "press Enter when done" pauses.
pub trait Prompt: Send + Sync + std::fmt::Debug {
    /// Ask a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn confirm(&self, question: &str) -> Result<bool>;

    /// Show `message` and block until the operator acknowledges it.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn pause(&self, message: &str) -> Result<()>;
}

/// Interactive prompts on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompt;

impl Prompt for DialoguerPrompt {
    fn confirm(&self, question: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(question)
            .default(true)
            .interact()
            .context("failed to read confirmation")
    }

    fn pause(&self, message: &str) -> Result<()> {
        Input::<String>::new()
            .with_prompt(format!("{message}\nPress Enter when done"))
            .allow_empty(true)
            .interact_text()
            .context("failed to read acknowledgement")?;
        Ok(())
    }
}

/// Answers yes to every gate and does not wait on pauses.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&self, _question: &str) -> Result<bool> {
        Ok(true)
    }

    fn pause(&self, _message: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn assume_yes_confirms_everything() {
        assert!(AssumeYes.confirm("Install shell tools?").unwrap());
        assert!(AssumeYes.pause("Install the GUI app").is_ok());
    }
}
