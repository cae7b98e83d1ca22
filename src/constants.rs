//! Application-wide constants.
//!
//! Centralized configuration values to avoid magic numbers throughout the codebase.

/// Remote whose tracking ref is compared when none is named.
pub const DEFAULT_REMOTE: &str = "origin";

/// Upstream branch compared against when no override is given.
const DEFAULT_BRANCH: &str = "master";

/// Returns the upstream branch name.
///
/// Can be customized via the GIT_AUTOPULL_BRANCH environment variable.
/// Falls back to `master` if not set or empty.
///
/// Example: `GIT_AUTOPULL_BRANCH=main git-autopull`
pub fn default_branch() -> String {
    std::env::var("GIT_AUTOPULL_BRANCH")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BRANCH.to_string())
}

/// Revision naming the currently checked-out commit.
pub const HEAD: &str = "HEAD";

/// One line per commit: `<short-hash> - <subject> (<author-name>, <relative-date>)`.
pub const COMMIT_LOG_FORMAT: &str = "--pretty=format:%h - %s (%an, %ar)";

/// Number of threads for parallel repository syncs.
/// Higher than CPU count because git operations are I/O-bound (network, disk).
pub const RAYON_THREAD_COUNT: usize = 32;

/// Progress bar tick interval in milliseconds.
pub const PROGRESS_TICK_MS: u64 = 80;

/// Maximum number of completed repositories to show in the workspace progress display.
pub const MAX_VISIBLE_COMPLETIONS: usize = 5;

/// Git directory name used to detect repositories.
pub const GIT_DIR: &str = ".git";

/// Default name used when a repository name cannot be determined from its path.
pub const DEFAULT_REPO_NAME: &str = "repository";
