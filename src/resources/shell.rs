//! Login shell resource.
use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;
use crate::probe::Probe;

/// The login shell, changed with `chsh`.
#[derive(Debug)]
pub struct DefaultShellResource<'a> {
    /// Target shell name (e.g., "zsh").
    target_shell: String,
    /// The current `$SHELL` value.
    current: String,
    probe: &'a dyn Probe,
    executor: &'a dyn Executor,
}

impl<'a> DefaultShellResource<'a> {
    /// Switch from `current` (the value of `$SHELL`) to `target_shell`.
    #[must_use]
    pub const fn new(
        target_shell: String,
        current: String,
        probe: &'a dyn Probe,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            target_shell,
            current,
            probe,
            executor,
        }
    }
}

impl Applicable for DefaultShellResource<'_> {
    fn description(&self) -> String {
        format!("default shell → {}", self.target_shell)
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.current_state()? == ResourceState::Correct {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        let Some(path) = self.probe.locate(&self.target_shell) else {
            return Ok(ResourceChange::Skipped {
                reason: format!("{} is not installed", self.target_shell),
            });
        };
        self.executor
            .run_interactive("chsh", &["-s", &path.to_string_lossy()])?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for DefaultShellResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let suffix = format!("/{}", self.target_shell);

        if self.current.ends_with(&suffix) {
            Ok(ResourceState::Correct)
        } else if self.current.is_empty() {
            Ok(ResourceState::Missing)
        } else {
            Ok(ResourceState::Incorrect {
                current: self.current.clone(),
            })
        }
    }
}
