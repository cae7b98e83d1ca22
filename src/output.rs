//! Progress bars, colored output, and summary formatting.
//!
//! This module provides visual feedback while repositories are synced,
//! including spinners, progress bars, merge warnings and the final summary.

use crate::config::Config;
use crate::constants::{MAX_VISIBLE_COMPLETIONS, PROGRESS_TICK_MS};
use crate::repo::repo_name;
use crate::sync::{SyncCallbacks, SyncOutcome, SyncReport, SyncResult, SyncStep};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Prints a repository header in verbose mode.
pub fn print_repo_header(config: &Config, repo_name: &str) {
    if !config.is_verbose() {
        return;
    }
    eprintln!("\n{}", format!("[{}]", repo_name).white().bold());
}

/// Prints a step progress message in verbose mode.
pub fn print_step(config: &Config, step: &SyncStep) {
    if !config.is_verbose() {
        return;
    }
    eprintln!("  {}...", step.to_string().dimmed());
}

/// Prints completion status (verbose mode only).
pub fn print_completion_status(config: &Config, report: &SyncReport) {
    if !config.is_verbose() {
        return;
    }
    match &report.outcome {
        SyncOutcome::Synced(result) => match listed_commits(result).len() {
            0 => eprintln!("  {} no new commits", "✓".green()),
            n => eprintln!("  {} pulled {} commit(s)", "✓".green(), n),
        },
        SyncOutcome::Failed(failure) => eprintln!("  {} failed: {}", "✗".red(), failure.error),
    }
}

/// Merge failures are printed in every verbosity: the sync itself succeeds,
/// so this line is the only place the operator learns about them.
pub fn print_merge_failure(repo: &Path, detail: &str) {
    eprintln!("{}", format_merge_failure(repo, detail));
}

fn format_merge_failure(repo: &Path, detail: &str) -> String {
    let mut message = format!(
        "{} {}: merge failed, working copy may not include the new commits",
        "warning:".yellow().bold(),
        repo.display()
    );
    for line in detail.lines().filter(|l| !l.trim().is_empty()) {
        message.push_str(&format!("\n  {}", line.dimmed()));
    }
    message
}

/// Progress wrapper for single repository syncs.
/// Uses `Option` to avoid allocation when progress is hidden (quiet/verbose modes).
pub struct SingleRepoProgress {
    spinner: Option<ProgressBar>,
}

impl SingleRepoProgress {
    pub fn update(&self, step: &SyncStep) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(format_step_message(step));
        }
    }

    /// Runs `f` with the spinner hidden so it can print.
    pub fn suspend<F: FnOnce()>(&self, f: F) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }

    pub fn finish(&self, report: &SyncReport) {
        let Some(spinner) = &self.spinner else {
            return;
        };
        let name = repo_name(&report.path);
        let message = match &report.outcome {
            SyncOutcome::Synced(result) => match listed_commits(result).len() {
                0 => format!("{} {} has no new commits", "✓".green(), name),
                n => format!("{} {} pulled {} commit(s)", "✓".green(), name, n),
            },
            SyncOutcome::Failed(failure) => {
                format!("{} {} failed: {}", "✗".red(), name, failure.error)
            }
        };
        spinner.finish_with_message(message);
    }
}

/// Callbacks for a single repository sync.
/// Combines spinner updates with verbose output handling.
pub struct SingleRepoCallbacks {
    progress: SingleRepoProgress,
    config: Config,
}

impl SingleRepoCallbacks {
    pub fn new(progress: SingleRepoProgress, config: Config) -> Self {
        Self { progress, config }
    }
}

impl SyncCallbacks for SingleRepoCallbacks {
    fn on_sync_start(&self, repo_name: &str) {
        print_repo_header(&self.config, repo_name);
    }

    fn on_step(&self, step: &SyncStep) {
        self.progress.update(step);
        print_step(&self.config, step);
    }

    fn on_merge_failed(&self, repo: &Path, detail: &str) {
        self.progress.suspend(|| print_merge_failure(repo, detail));
    }

    fn on_complete(&self, report: &SyncReport) {
        self.progress.finish(report);
        print_completion_status(&self.config, report);
    }
}

/// Consolidated state for workspace progress tracking, kept behind one lock.
struct CompletionState {
    /// Recently completed repos for display (bounded by MAX_VISIBLE_COMPLETIONS)
    repos: VecDeque<(String, bool)>,
    failed_count: usize,
    total_completed: usize,
}

/// Thread-safe progress tracker for workspace mode.
/// Shows a progress bar with the completion count and recent results.
#[derive(Clone)]
pub struct WorkspaceProgress {
    multi: Arc<MultiProgress>,
    main_bar: ProgressBar,
    completion_slots: Vec<ProgressBar>,
    state: Arc<Mutex<CompletionState>>,
}

impl WorkspaceProgress {
    pub fn create_repo_tracker(&self, repo_name: &str, config: Config) -> RepoProgressTracker {
        RepoProgressTracker {
            repo_name: repo_name.to_string(),
            workspace: self.clone(),
            config,
        }
    }

    pub fn mark_completed(&self, repo_name: &str, success: bool) {
        self.main_bar.inc(1);

        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };

        if !success {
            state.failed_count += 1;
            self.main_bar
                .set_message(format!("│ {} failed", state.failed_count).red().to_string());
        }

        state.total_completed += 1;
        state.repos.push_back((repo_name.to_string(), success));

        while state.repos.len() > MAX_VISIBLE_COMPLETIONS {
            state.repos.pop_front();
        }

        self.redraw_completions(&state);
    }

    pub fn print_merge_failure(&self, repo: &Path, detail: &str) {
        self.multi.suspend(|| print_merge_failure(repo, detail));
    }

    pub fn finish(&self) {
        self.main_bar.finish_and_clear();
        for slot in &self.completion_slots {
            slot.finish_and_clear();
        }
    }

    fn redraw_completions(&self, state: &CompletionState) {
        let show_ellipsis = state.total_completed > MAX_VISIBLE_COMPLETIONS;

        for (i, slot) in self.completion_slots.iter().enumerate() {
            if i == 0 && show_ellipsis {
                slot.set_message("...".dimmed().to_string());
            } else {
                let idx = if show_ellipsis { i - 1 } else { i };
                if idx < state.repos.len() {
                    let (name, success) = &state.repos[idx];
                    let symbol = if *success { "✓".green() } else { "✗".red() };
                    slot.set_message(format!("{} {}", symbol, name));
                } else {
                    slot.set_message("");
                }
            }
        }
    }
}

/// Per-repository progress tracker for workspace mode.
#[derive(Clone)]
pub struct RepoProgressTracker {
    repo_name: String,
    workspace: WorkspaceProgress,
    config: Config,
}

impl SyncCallbacks for RepoProgressTracker {
    fn on_sync_start(&self, repo_name: &str) {
        print_repo_header(&self.config, repo_name);
    }

    fn on_step(&self, step: &SyncStep) {
        print_step(&self.config, step);
    }

    fn on_merge_failed(&self, repo: &Path, detail: &str) {
        self.workspace.print_merge_failure(repo, detail);
    }

    fn on_complete(&self, report: &SyncReport) {
        let success = matches!(report.outcome, SyncOutcome::Synced(_));
        self.workspace.mark_completed(&self.repo_name, success);
        print_completion_status(&self.config, report);
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Creates a spinner-based progress tracker for a single repository.
/// Returns a hidden tracker in quiet or verbose mode.
#[must_use]
pub fn create_single_repo_progress(config: &Config) -> SingleRepoProgress {
    let spinner = if config.is_quiet() || config.is_verbose() {
        None
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
        Some(spinner)
    };

    SingleRepoProgress { spinner }
}

/// Creates a progress bar for workspace syncs showing completion count.
/// Returns hidden progress bars in quiet or verbose mode.
#[must_use]
pub fn create_workspace_progress(total: usize, config: &Config) -> WorkspaceProgress {
    let multi = Arc::new(MultiProgress::new());
    let hide_progress = config.is_quiet() || config.is_verbose();

    let main_bar = if hide_progress {
        ProgressBar::hidden()
    } else {
        let bar = multi.add(ProgressBar::new(total as u64));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {pos}/{len} synced {spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█░"),
        );
        bar.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
        bar
    };

    let completion_slots: Vec<ProgressBar> = if hide_progress {
        vec![]
    } else {
        (0..MAX_VISIBLE_COMPLETIONS)
            .map(|_| {
                let slot = multi.add(ProgressBar::new_spinner());
                slot.set_style(
                    ProgressStyle::default_spinner()
                        .template("  {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                slot
            })
            .collect()
    };

    WorkspaceProgress {
        multi,
        main_bar,
        completion_slots,
        state: Arc::new(Mutex::new(CompletionState {
            repos: VecDeque::new(),
            failed_count: 0,
            total_completed: 0,
        })),
    }
}

pub fn print_working_dir(path: &Path, config: &Config) {
    if config.is_quiet() {
        return;
    }
    println!(
        "{} {}",
        "Working in:".cyan(),
        path.display().to_string().white().bold()
    )
}

pub fn print_workspace_start(count: usize, config: &Config) {
    if config.is_quiet() {
        return;
    }
    if count == 0 {
        print_no_repos()
    } else {
        println!(
            "{}",
            format!(
                "Syncing {} repositories against {}",
                count,
                config.upstream()
            )
            .dimmed()
        )
    }
}

pub fn print_summary(reports: &[SyncReport], duration: Duration, config: &Config) {
    if config.is_quiet() {
        print_quiet_summary(reports);
    } else {
        print_normal_summary(reports, duration);
    }
}

fn print_quiet_summary(reports: &[SyncReport]) {
    let (synced, failed): (Vec<_>, Vec<_>) = reports
        .iter()
        .partition(|r| matches!(r.outcome, SyncOutcome::Synced(_)));

    println!("{}/{} repositories synced", synced.len(), reports.len());

    for report in &failed {
        if let SyncOutcome::Failed(failure) = &report.outcome {
            eprintln!("error: {}", failure.error);
        }
    }
}

fn print_normal_summary(reports: &[SyncReport], duration: Duration) {
    print_section("Summary");
    let (synced, failed): (Vec<_>, Vec<_>) = reports
        .iter()
        .partition(|r| matches!(r.outcome, SyncOutcome::Synced(_)));

    print_synced(&synced);
    print_failures(&failed);

    println!(
        "{}: {}/{} repos in {}",
        "Total".white().bold(),
        synced.len(),
        reports.len(),
        format_duration(duration)
    );
}

fn print_no_repos() {
    println!("{}", "No git repositories found".yellow().bold())
}

fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f32())
}

fn print_section(title: &str) {
    let line = "=".repeat(50).cyan().dimmed();
    let padding = (50 - title.len()) / 2;
    let centered = format!("{:>width$}", title, width = padding + title.len());
    println!("\n{}\n{}\n{}\n", line, centered.cyan().bold(), line);
}

fn print_synced(synced: &[&SyncReport]) {
    if synced.is_empty() {
        return;
    }
    println!("{}", format!("Synced ({}):", synced.len()).green().bold());

    for report in synced {
        if let SyncOutcome::Synced(result) = &report.outcome {
            let commits = listed_commits(result);
            let status = if commits.is_empty() {
                "no new commits".dimmed()
            } else {
                format!("{} new commit(s)", commits.len()).cyan()
            };
            println!(
                "  {} {} {} in {}",
                "OK".green().bold(),
                report.path.display().to_string().white(),
                status,
                format_duration(report.duration).dimmed(),
            );
            for commit in commits {
                println!("      {}", commit);
            }
        }
    }
    println!();
}

fn print_failures(failures: &[&SyncReport]) {
    if failures.is_empty() {
        return;
    }

    println!("{}", format!("Failed ({}):", failures.len()).red().bold());

    for report in failures {
        if let SyncOutcome::Failed(failure) = &report.outcome {
            println!(
                "  {} {} {} in {}",
                "FAIL".red().bold(),
                report.path.display().to_string().white(),
                format!("while {}: {}", failure.step, failure.error).red(),
                format_duration(report.duration).dimmed(),
            );
        }
    }
    println!();
}

/// Commit lines worth showing. A checkout that is ahead of its upstream
/// yields a single empty line from the log.
fn listed_commits(result: &SyncResult) -> Vec<&str> {
    result
        .commits
        .iter()
        .map(String::as_str)
        .filter(|line| !line.trim().is_empty())
        .collect()
}

fn format_step_message(step: &SyncStep) -> &'static str {
    match step {
        SyncStep::Started => "Starting sync...",
        SyncStep::Fetching => "Fetching from remote...",
        SyncStep::Comparing => "Comparing local and remote revisions...",
        SyncStep::ListingCommits => "Listing new commits...",
        SyncStep::Merging => "Merging upstream changes...",
        SyncStep::Completed => "Completed",
    }
}
