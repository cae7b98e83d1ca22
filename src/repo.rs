// Repository handle, validation and workspace discovery

use crate::constants::{DEFAULT_REPO_NAME, GIT_DIR, HEAD};
use crate::error::SyncError;
use crate::git::{self, GitRunner};
use std::path::{Path, PathBuf};

/// A checkout whose current revision resolved when it was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    path: PathBuf,
}

impl Repository {
    /// Opens `path`, failing with [`SyncError::NotARepository`] if its current
    /// revision cannot be resolved.
    pub fn open<G>(git: &G, path: impl Into<PathBuf>) -> Result<Self, SyncError>
    where
        G: GitRunner + ?Sized,
    {
        let path = path.into();
        if !is_valid_repository(git, &path) {
            return Err(SyncError::NotARepository { path });
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last path component, for display.
    pub fn name(&self) -> &str {
        repo_name(&self.path)
    }
}

/// True if the current revision of `path` resolves to a commit.
///
/// A freshly initialized repository without commits is not valid.
pub fn is_valid_repository<G>(git: &G, path: &Path) -> bool
where
    G: GitRunner + ?Sized,
{
    !git::rev_parse(git, path, HEAD).is_empty()
}

pub fn repo_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_REPO_NAME)
}

pub fn is_git_repo(path: &Path) -> bool {
    path.join(GIT_DIR).exists()
}

/// Immediate subdirectories of `path` that contain a `.git` entry, sorted.
pub fn find_git_repos(path: &Path) -> Vec<PathBuf> {
    let mut repos: Vec<PathBuf> = std::fs::read_dir(path)
        .into_iter()
        .flatten()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir() && is_git_repo(p))
        .collect();
    repos.sort();
    repos
}
