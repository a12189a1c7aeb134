//! Idempotent resource primitives (check + apply pattern).
pub mod archive;
pub mod aur;
pub mod helpers;
pub mod package;
pub mod shell;
pub mod source;
pub mod symlink;

use anyhow::Result;

/// Minimal interface for resources that can be described and applied.
///
/// Resources whose presence is decided elsewhere (by the capability probe)
/// implement only this trait. Resources that can inspect their own state
/// implement the richer [`Resource`] super-trait.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// permission issues, failed downloads, or other system errors.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a resource.
///
/// # Examples
///
/// ```
/// use devsetup_cli::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let wrong = ResourceState::Incorrect { current: "/other/path".into() };
///
/// assert_ne!(missing, correct);
/// assert_ne!(wrong, correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g., the link source is missing).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
    /// Resource was skipped.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Resources that can be checked as well as applied.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;
}

/// Shared test helpers for resource and provisioning unit tests.
#[cfg(test)]
#[allow(clippy::unwrap_used, missing_docs)]
pub mod test_helpers {
    use crate::exec::{ExecResult, Executor};
    use crate::probe::Probe;
    use std::collections::{HashMap, HashSet};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A fake host that is both an [`Executor`] and a [`Probe`].
    ///
    /// Every command is recorded as a single space-joined line. A command
    /// line containing a registered failure pattern fails; one containing
    /// an install pattern makes the associated tool present for later probes.
    #[derive(Debug, Default)]
    pub struct FakeHost {
        present: Mutex<HashSet<String>>,
        calls: Mutex<Vec<String>>,
        effects: Mutex<Vec<(String, String)>>,
        failures: Mutex<Vec<String>>,
        stdout: Mutex<HashMap<String, String>>,
        probes: AtomicUsize,
    }

    impl FakeHost {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Mark commands as already present.
        #[must_use]
        pub fn with_present(self, names: &[&str]) -> Self {
            self.present
                .lock()
                .unwrap()
                .extend(names.iter().map(|s| (*s).to_string()));
            self
        }

        /// A successful command containing `pattern` makes `tool` present.
        #[must_use]
        pub fn installs(self, pattern: &str, tool: &str) -> Self {
            self.effects
                .lock()
                .unwrap()
                .push((pattern.to_string(), tool.to_string()));
            self
        }

        /// Commands containing `pattern` exit non-zero.
        #[must_use]
        pub fn failing(self, pattern: &str) -> Self {
            self.failures.lock().unwrap().push(pattern.to_string());
            self
        }

        /// Captured stdout for `program` when run with [`Executor::run`].
        #[must_use]
        pub fn with_stdout(self, program: &str, stdout: &str) -> Self {
            self.stdout
                .lock()
                .unwrap()
                .insert(program.to_string(), stdout.to_string());
            self
        }

        /// Every recorded command line, in order.
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        /// Number of probe lookups made so far.
        #[must_use]
        pub fn probe_count(&self) -> usize {
            self.probes.load(Ordering::SeqCst)
        }

        fn record(&self, program: &str, args: &[&str]) -> anyhow::Result<()> {
            let line = std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            self.calls.lock().unwrap().push(line.clone());
            if self
                .failures
                .lock()
                .unwrap()
                .iter()
                .any(|p| line.contains(p.as_str()))
            {
                anyhow::bail!("{program} failed (exit 1)");
            }
            let made_present: Vec<String> = self
                .effects
                .lock()
                .unwrap()
                .iter()
                .filter(|(p, _)| line.contains(p.as_str()))
                .map(|(_, tool)| tool.clone())
                .collect();
            self.present.lock().unwrap().extend(made_present);
            Ok(())
        }
    }

    impl Executor for FakeHost {
        fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            self.record(program, args)?;
            let stdout = self
                .stdout
                .lock()
                .unwrap()
                .get(program)
                .cloned()
                .unwrap_or_default();
            Ok(ExecResult {
                stdout,
                stderr: String::new(),
                success: true,
                code: Some(0),
            })
        }

        fn run_interactive(&self, program: &str, args: &[&str]) -> anyhow::Result<()> {
            self.record(program, args)
        }

        fn run_interactive_in(
            &self,
            _dir: &Path,
            program: &str,
            args: &[&str],
            env: &[(&str, &str)],
        ) -> anyhow::Result<()> {
            let prefixed: Vec<String> = env.iter().map(|(k, v)| format!("{k}={v}")).collect();
            let mut all: Vec<&str> = prefixed.iter().map(String::as_str).collect();
            all.push(program);
            all.extend_from_slice(args);
            let (first, rest) = all.split_first().map_or((program, &[][..]), |(f, r)| (*f, r));
            self.record(first, rest)
        }
    }

    impl Probe for FakeHost {
        fn locate(&self, command: &str) -> Option<PathBuf> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.present
                .lock()
                .unwrap()
                .contains(command)
                .then(|| PathBuf::from("/usr/bin").join(command))
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::test_helpers::FakeHost;
    use crate::exec::Executor;
    use crate::probe::Probe;

    #[test]
    fn fake_host_install_effect_makes_tool_present() {
        let host = FakeHost::new().installs("apt-get install -y ripgrep", "rg");
        assert!(!host.is_present("rg"));
        host.run_interactive("sudo", &["apt-get", "install", "-y", "ripgrep"])
            .unwrap();
        assert!(host.is_present("rg"));
        assert_eq!(host.calls(), vec!["sudo apt-get install -y ripgrep"]);
    }

    #[test]
    fn fake_host_records_env_prefix() {
        let host = FakeHost::new();
        host.run_interactive_in(
            std::path::Path::new("/tmp"),
            "makepkg",
            &["-si"],
            &[("MAKEFLAGS", "-j4")],
        )
        .unwrap();
        assert_eq!(host.calls(), vec!["MAKEFLAGS=-j4 makepkg -si"]);
    }
}
