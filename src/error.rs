use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a repository from being opened or synced.
///
/// Merge failures are deliberately absent: they are reported through
/// [`crate::sync::SyncCallbacks::on_merge_failed`] and the sync still succeeds.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The current revision of `path` could not be resolved.
    #[error("{} is not a valid git repo", path.display())]
    NotARepository { path: PathBuf },

    /// `git fetch` failed; nothing was compared or merged.
    #[error("fetch failed for {}: {detail}", path.display())]
    FetchFailed { path: PathBuf, detail: String },

    /// New commits exist but could not be listed; no merge was attempted.
    #[error("could not list new commits for {}: {detail}", path.display())]
    LogFailed { path: PathBuf, detail: String },
}
