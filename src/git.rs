//! Git command wrappers.
//!
//! Every git invocation goes through a [`GitRunner`], so the sync logic can be
//! driven by the real `git` binary ([`SystemGit`]) or by a scripted fake.

use crate::constants::COMMIT_LOG_FORMAT;
use anyhow::Context;
use colored::Colorize;
use std::path::Path;

/// Called with the repository and arguments right before git is spawned.
pub type GitLogger = fn(repo: &Path, args: &[&str]);

/// Prints the command about to run to stderr.
pub fn verbose_logger(repo: &Path, args: &[&str]) {
    eprintln!(
        "    {} {}",
        "$".dimmed(),
        format!("git {}  ({})", args.join(" "), repo.display()).dimmed()
    );
}

pub fn no_op_logger(_repo: &Path, _args: &[&str]) {}

/// Exit status and captured streams of one git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// Stdout followed by stderr, trimmed.
    pub fn combined(&self) -> String {
        let mut out = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        out.push_str(self.stdout.trim_end());
        if !out.is_empty() && !self.stderr.trim().is_empty() {
            out.push('\n');
        }
        out.push_str(self.stderr.trim_end());
        out.trim().to_string()
    }
}

impl From<std::process::Output> for GitOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

pub trait GitRunner {
    /// Run `git` inside `repo` with `args`.
    ///
    /// # Errors
    /// Returns an error only if the process could not be spawned. A git command
    /// that ran and failed is reported through [`GitOutput::success`].
    fn run(&self, repo: &Path, args: &[&str]) -> anyhow::Result<GitOutput>;
}

/// Runs the `git` binary found on `PATH`.
#[derive(Debug, Clone, Copy)]
pub struct SystemGit {
    logger: GitLogger,
}

impl SystemGit {
    pub fn new(logger: GitLogger) -> Self {
        Self { logger }
    }
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new(no_op_logger)
    }
}

impl GitRunner for SystemGit {
    fn run(&self, repo: &Path, args: &[&str]) -> anyhow::Result<GitOutput> {
        (self.logger)(repo, args);
        let output = std::process::Command::new("git")
            .current_dir(repo)
            .args(args)
            .output()
            .context("Failed to execute git command")?;
        Ok(output.into())
    }
}

/// Runs git and returns trimmed stdout, failing on a non-zero exit.
pub fn run_git(repo: &Path, args: &[&str]) -> anyhow::Result<String> {
    let output = SystemGit::default().run(repo, args)?;
    if output.success {
        Ok(output.stdout.trim().to_string())
    } else {
        anyhow::bail!("git {} failed: {}", args.join(" "), output.stderr.trim())
    }
}

fn run_checked<G>(git: &G, repo: &Path, args: &[&str]) -> anyhow::Result<GitOutput>
where
    G: GitRunner + ?Sized,
{
    let output = git.run(repo, args)?;
    if output.success {
        Ok(output)
    } else {
        anyhow::bail!("git {} failed: {}", args.join(" "), output.combined())
    }
}

/// Resolves `rev` to a commit id.
///
/// Returns an empty string when the revision cannot be resolved, including when
/// `repo` is not a repository or git could not be started.
pub fn rev_parse<G>(git: &G, repo: &Path, rev: &str) -> String
where
    G: GitRunner + ?Sized,
{
    match git.run(repo, &["rev-parse", "--verify", "--quiet", rev]) {
        Ok(output) if output.success => output.stdout.trim().to_string(),
        _ => String::new(),
    }
}

/// Runs `git fetch`, naming `remote` only when one is given.
pub fn fetch<G>(git: &G, repo: &Path, remote: Option<&str>) -> anyhow::Result<()>
where
    G: GitRunner + ?Sized,
{
    let mut args = vec!["fetch"];
    args.extend(remote);
    run_checked(git, repo, &args).context("Failed to fetch from remote")?;
    Ok(())
}

/// Lists commits in `range`, one formatted summary per line, untrimmed.
pub fn log_range<G>(git: &G, repo: &Path, range: &str) -> anyhow::Result<String>
where
    G: GitRunner + ?Sized,
{
    run_checked(git, repo, &["log", range, COMMIT_LOG_FORMAT])
        .map(|output| output.stdout)
        .with_context(|| format!("Failed to list commits in '{}'", range))
}

pub fn merge<G>(git: &G, repo: &Path, upstream: &str) -> anyhow::Result<()>
where
    G: GitRunner + ?Sized,
{
    run_checked(git, repo, &["merge", "--quiet", "--no-edit", upstream])
        .with_context(|| format!("Failed to merge '{}'", upstream))?;
    Ok(())
}
