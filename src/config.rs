//! Configuration types for CLI verbosity and the tracked upstream.

use crate::constants::{self, DEFAULT_REMOTE};
use crate::git::{self, GitLogger, SystemGit};

/// Runtime configuration derived from CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Controls the verbosity level of CLI output.
    pub verbosity: Verbosity,
    /// Remote passed to `git fetch`. `None` runs a bare `git fetch`, which
    /// follows the branch's configured remote and succeeds when there is none.
    pub remote: Option<String>,
    /// Branch on `remote` that the checkout is compared with and merged from.
    pub branch: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            remote: None,
            branch: constants::default_branch(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Remote-tracking ref, e.g. `origin/master`.
    #[must_use]
    pub fn upstream(&self) -> String {
        let remote = self.remote.as_deref().unwrap_or(DEFAULT_REMOTE);
        format!("{}/{}", remote, self.branch)
    }

    /// Returns the appropriate git logger based on verbosity settings.
    ///
    /// Config only picks which logger function to use; the loggers themselves
    /// live in the git module.
    #[must_use]
    pub fn git_logger(&self) -> GitLogger {
        if self.is_verbose() {
            git::verbose_logger
        } else {
            git::no_op_logger
        }
    }

    /// A git runner wired to this config's logger.
    #[must_use]
    pub fn system_git(&self) -> SystemGit {
        SystemGit::new(self.git_logger())
    }
}

/// Verbosity level for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}
