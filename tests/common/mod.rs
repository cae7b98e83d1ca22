//! Test infrastructure for git-autopull integration tests.
#![allow(dead_code)]

use anyhow::Result;
use git_autopull::config::{Config, Verbosity};
use git_autopull::git::{GitOutput, GitRunner, run_git};
use git_autopull::sync::{SyncCallbacks, SyncReport, SyncStep};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub fn test_config() -> Config {
    Config {
        verbosity: Verbosity::Quiet,
        remote: None,
        branch: "master".to_string(),
    }
}

fn configure_identity(path: &Path) -> Result<()> {
    run_git(path, &["config", "user.email", "test@example.com"])?;
    run_git(path, &["config", "user.name", "Test User"])?;
    run_git(path, &["config", "commit.gpgsign", "false"])?;
    Ok(())
}

/// A temporary git repository for testing.
/// Automatically cleaned up when dropped.
pub struct TestRepo {
    _temp_dir: TempDir,
    path: PathBuf,
    remote: Option<TempDir>,
}

impl TestRepo {
    /// Creates a new test repository with an initial commit on the master branch.
    pub fn new() -> Result<Self> {
        let repo = Self::empty()?;
        repo.commit_file("README.md", "# Test Repo\n", "Initial commit")?;
        Ok(repo)
    }

    /// Creates an initialized repository with no commits.
    pub fn empty() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();

        run_git(&path, &["init", "-b", "master"])?;
        configure_identity(&path)?;

        Ok(Self {
            _temp_dir: temp_dir,
            path,
            remote: None,
        })
    }

    /// Creates a test repository tracking a bare `origin` in another temp dir.
    pub fn with_remote() -> Result<Self> {
        let remote_dir = TempDir::new()?;
        run_git(remote_dir.path(), &["init", "--bare", "-b", "master"])?;

        let mut local = Self::new()?;
        let remote_path = path_str(remote_dir.path())?;
        run_git(&local.path, &["remote", "add", "origin", remote_path])?;
        run_git(&local.path, &["push", "-u", "origin", "master"])?;

        local.remote = Some(remote_dir);
        Ok(local)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn head(&self) -> Result<String> {
        run_git(&self.path, &["rev-parse", "HEAD"])
    }

    pub fn commit_file(&self, name: &str, contents: &str, message: &str) -> Result<()> {
        std::fs::write(self.path.join(name), contents)?;
        run_git(&self.path, &["add", name])?;
        run_git(&self.path, &["commit", "-m", message])?;
        Ok(())
    }

    /// Pushes one commit per message to `origin/master` from a separate clone,
    /// leaving this checkout behind.
    pub fn push_upstream_commits(&self, messages: &[&str]) -> Result<()> {
        self.push_upstream_changes(
            &messages
                .iter()
                .enumerate()
                .map(|(i, msg)| (format!("upstream-{}.txt", i), msg.to_string(), msg.to_string()))
                .collect::<Vec<_>>(),
        )
    }

    /// Like [`push_upstream_commits`] with explicit `(file, contents, message)`.
    pub fn push_upstream_changes(&self, changes: &[(String, String, String)]) -> Result<()> {
        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("repository has no remote"))?;
        let clone_dir = TempDir::new()?;
        let clone_path = clone_dir.path().join("clone");

        run_git(
            clone_dir.path(),
            &["clone", path_str(remote.path())?, path_str(&clone_path)?],
        )?;
        configure_identity(&clone_path)?;

        for (file, contents, message) in changes {
            std::fs::write(clone_path.join(file), contents)?;
            run_git(&clone_path, &["add", file])?;
            run_git(&clone_path, &["commit", "-m", message])?;
        }
        run_git(&clone_path, &["push", "origin", "master"])?;
        Ok(())
    }

    /// Points `origin` somewhere that cannot be fetched.
    pub fn break_remote(&self) -> Result<()> {
        run_git(
            &self.path,
            &["remote", "set-url", "origin", "/nonexistent/remote.git"],
        )?;
        Ok(())
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow::anyhow!("non-UTF-8 path: {}", path.display()))
}

pub fn ok(stdout: &str) -> GitOutput {
    GitOutput {
        success: true,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed(stderr: &str) -> GitOutput {
    GitOutput {
        success: false,
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// A `GitRunner` that answers from a script and records every call.
///
/// Responses are keyed by subcommand (`fetch`, `log`, `merge`), except
/// `rev-parse` which is keyed as `rev-parse <rev>`. Unscripted calls fail.
#[derive(Default)]
pub struct ScriptedGit {
    responses: HashMap<String, GitOutput>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, key: &str, output: GitOutput) -> Self {
        self.responses.insert(key.to_string(), output);
        self
    }

    /// Scripts the two resolver calls made while comparing.
    pub fn revisions(self, local: &str, remote: &str) -> Self {
        self.respond("rev-parse HEAD", ok(&format!("{}\n", local)))
            .respond("rev-parse origin/master", ok(&format!("{}\n", remote)))
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, subcommand: &str) -> usize {
        self.calls()
            .iter()
            .filter(|args| args.first().map(String::as_str) == Some(subcommand))
            .count()
    }

    fn key(args: &[&str]) -> String {
        match args {
            ["rev-parse", .., rev] => format!("rev-parse {}", rev),
            [subcommand, ..] => subcommand.to_string(),
            [] => String::new(),
        }
    }
}

impl GitRunner for ScriptedGit {
    fn run(&self, _repo: &Path, args: &[&str]) -> Result<GitOutput> {
        self.calls
            .lock()
            .unwrap()
            .push(args.iter().map(|a| a.to_string()).collect());
        Ok(self
            .responses
            .get(&Self::key(args))
            .cloned()
            .unwrap_or_else(|| failed("unscripted git call")))
    }
}

/// Callbacks that count notifications and keep merge failure details.
#[derive(Clone, Default)]
pub struct RecordingCallbacks {
    pub steps: Arc<Mutex<Vec<SyncStep>>>,
    pub merge_failures: Arc<Mutex<Vec<(PathBuf, String)>>>,
    pub completed: Arc<AtomicUsize>,
}

impl RecordingCallbacks {
    pub fn steps(&self) -> Vec<SyncStep> {
        self.steps.lock().unwrap().clone()
    }

    pub fn merge_failures(&self) -> Vec<(PathBuf, String)> {
        self.merge_failures.lock().unwrap().clone()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl SyncCallbacks for RecordingCallbacks {
    fn on_step(&self, step: &SyncStep) {
        self.steps.lock().unwrap().push(*step);
    }

    fn on_merge_failed(&self, repo: &Path, detail: &str) {
        self.merge_failures
            .lock()
            .unwrap()
            .push((repo.to_path_buf(), detail.to_string()));
    }

    fn on_complete(&self, _report: &SyncReport) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Asserts `line` looks like `<hash> - <subject> (Test User, <relative-date>)`.
pub fn assert_commit_line(line: &str, subject: &str) {
    let (hash, rest) = line
        .split_once(" - ")
        .unwrap_or_else(|| panic!("missing ' - ' separator in {:?}", line));
    assert!(
        hash.len() >= 7 && hash.chars().all(|c| c.is_ascii_hexdigit()),
        "bad short hash in {:?}",
        line
    );
    let expected_prefix = format!("{} (Test User, ", subject);
    assert!(
        rest.starts_with(&expected_prefix),
        "expected {:?} to start with {:?}",
        rest,
        expected_prefix
    );
    assert!(rest.ends_with(" ago)"), "bad relative date in {:?}", line);
}
