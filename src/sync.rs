//! Fetch, compare, list and merge.
//!
//! [`sync`] brings one opened [`Repository`] up to date with its upstream and
//! reports the commits that were new. [`sync_repo`] and [`sync_workspace`] wrap
//! it with opening, timing and progress reporting for the CLI.

use crate::config::Config;
use crate::constants::{HEAD, RAYON_THREAD_COUNT};
use crate::error::SyncError;
use crate::git::{self, GitRunner};
use crate::repo::{Repository, repo_name};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    Started,
    Fetching,
    Comparing,
    ListingCommits,
    Merging,
    Completed,
}

impl std::fmt::Display for SyncStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyncStep::Started => "started",
            SyncStep::Fetching => "fetching",
            SyncStep::Comparing => "comparing revisions",
            SyncStep::ListingCommits => "listing new commits",
            SyncStep::Merging => "merging",
            SyncStep::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Commits pulled into one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub repository: PathBuf,
    /// `<short-hash> - <subject> (<author>, <relative-date>)`, in git log order.
    /// Empty only when the checkout already matched its upstream.
    pub commits: Vec<String>,
}

impl SyncResult {
    pub fn is_up_to_date(&self) -> bool {
        self.commits.is_empty()
    }
}

#[derive(Debug)]
pub struct SyncReport {
    pub path: PathBuf,
    pub outcome: SyncOutcome,
    pub duration: Duration,
}

#[derive(Debug)]
pub struct SyncFailure {
    pub error: SyncError,
    pub step: SyncStep,
}

#[derive(Debug)]
pub enum SyncOutcome {
    Synced(SyncResult),
    Failed(SyncFailure),
}

/// Progress notifications emitted while syncing.
pub trait SyncCallbacks {
    fn on_sync_start(&self, _repo_name: &str) {}

    /// Called before `step` runs.
    fn on_step(&self, step: &SyncStep);

    /// The merge failed; the sync result still lists the detected commits.
    fn on_merge_failed(&self, _repo: &Path, _detail: &str) {}

    fn on_complete(&self, report: &SyncReport);
}

/// Callbacks that ignore every notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpCallbacks;

impl SyncCallbacks for NoOpCallbacks {
    fn on_step(&self, _step: &SyncStep) {}
    fn on_complete(&self, _report: &SyncReport) {}
}

/// Fetches, and if the checkout differs from `config.upstream()`
/// lists the new commits and merges them.
///
/// A failed fetch or log aborts with an error. A failed merge does not: it is
/// passed to [`SyncCallbacks::on_merge_failed`] and the listed commits are
/// returned as usual.
pub fn sync<G, C>(
    git: &G,
    repo: &Repository,
    config: &Config,
    callbacks: &C,
) -> Result<SyncResult, SyncError>
where
    G: GitRunner + ?Sized,
    C: SyncCallbacks + ?Sized,
{
    let path = repo.path();
    let upstream = config.upstream();
    let mut result = SyncResult {
        repository: path.to_path_buf(),
        commits: Vec::new(),
    };

    callbacks.on_step(&SyncStep::Fetching);
    git::fetch(git, path, config.remote.as_deref()).map_err(|e| SyncError::FetchFailed {
        path: path.to_path_buf(),
        detail: format!("{:#}", e),
    })?;

    callbacks.on_step(&SyncStep::Comparing);
    let local = git::rev_parse(git, path, HEAD);
    let remote = git::rev_parse(git, path, &upstream);
    if local == remote {
        callbacks.on_step(&SyncStep::Completed);
        return Ok(result);
    }

    callbacks.on_step(&SyncStep::ListingCommits);
    let log = git::log_range(git, path, &format!("{}..{}", HEAD, upstream)).map_err(|e| {
        SyncError::LogFailed {
            path: path.to_path_buf(),
            detail: format!("{:#}", e),
        }
    })?;
    result.commits = split_commit_lines(&log);

    callbacks.on_step(&SyncStep::Merging);
    if let Err(e) = git::merge(git, path, &upstream) {
        callbacks.on_merge_failed(path, &format!("{:#}", e));
    }

    callbacks.on_step(&SyncStep::Completed);
    Ok(result)
}

/// One entry per line break-separated segment, kept as git produced them.
fn split_commit_lines(log: &str) -> Vec<String> {
    log.split('\n').map(str::to_string).collect()
}

fn failed_step(error: &SyncError) -> SyncStep {
    match error {
        SyncError::NotARepository { .. } => SyncStep::Started,
        SyncError::FetchFailed { .. } => SyncStep::Fetching,
        SyncError::LogFailed { .. } => SyncStep::ListingCommits,
    }
}

/// Opens and syncs `path`, timing the whole run.
pub fn sync_repo<G, C>(git: &G, path: &Path, callbacks: &C, config: &Config) -> SyncReport
where
    G: GitRunner + ?Sized,
    C: SyncCallbacks + ?Sized,
{
    let start = Instant::now();
    callbacks.on_sync_start(repo_name(path));
    callbacks.on_step(&SyncStep::Started);

    let synced = Repository::open(git, path).and_then(|repo| sync(git, &repo, config, callbacks));
    let outcome = match synced {
        Ok(result) => SyncOutcome::Synced(result),
        Err(error) => SyncOutcome::Failed(SyncFailure {
            step: failed_step(&error),
            error,
        }),
    };

    let report = SyncReport {
        path: path.to_path_buf(),
        outcome,
        duration: start.elapsed(),
    };
    callbacks.on_complete(&report);
    report
}

/// Syncs independent repositories in parallel. Reports come back in the order
/// of `paths`.
pub fn sync_workspace<G, C, F>(
    git: &G,
    paths: &[PathBuf],
    make_callbacks: F,
    config: &Config,
) -> Vec<SyncReport>
where
    G: GitRunner + Sync + ?Sized,
    C: SyncCallbacks,
    F: Fn(&Path) -> C + Sync,
{
    let run = || {
        paths
            .par_iter()
            .map(|path| {
                let callbacks = make_callbacks(path.as_path());
                sync_repo(git, path, &callbacks, config)
            })
            .collect::<Vec<_>>()
    };

    match rayon::ThreadPoolBuilder::new()
        .num_threads(RAYON_THREAD_COUNT)
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(_) => run(),
    }
}
