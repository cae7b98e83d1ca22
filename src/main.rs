use clap::Parser;
use git_autopull::config::{Config, Verbosity};
use git_autopull::sync::{self, SyncOutcome, SyncReport};
use git_autopull::{output, repo};
use std::path::PathBuf;
use std::time::Instant;

/// Fetch and merge upstream changes into local git checkouts, reporting the
/// commits that came in.
#[derive(Debug, Parser)]
#[command(name = "git-autopull", version, about)]
struct Cli {
    /// Repositories to sync. Defaults to the current directory.
    paths: Vec<PathBuf>,

    /// Sync every repository directly under this directory.
    #[arg(short, long, value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// Remote to fetch from [default: the branch's configured remote, compared as origin]
    #[arg(long)]
    remote: Option<String>,

    /// Upstream branch to compare with and merge [env: GIT_AUTOPULL_BRANCH, default: master]
    #[arg(long)]
    branch: Option<String>,

    /// Only print a one-line summary and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print every step and git command.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        let verbosity = if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        let defaults = Config::default();
        Config {
            verbosity,
            remote: self.remote.clone(),
            branch: self.branch.clone().unwrap_or(defaults.branch),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config();
    let git = config.system_git();
    let cwd = std::env::current_dir()?;

    let mut targets = cli.paths.clone();
    if let Some(dir) = &cli.workspace {
        targets.extend(repo::find_git_repos(dir));
    }
    if cli.paths.is_empty() && cli.workspace.is_none() {
        output::print_working_dir(&cwd, &config);
        if repo::is_valid_repository(&git, &cwd) {
            targets.push(cwd.clone());
        } else {
            targets = repo::find_git_repos(&cwd);
        }
    }

    if targets.is_empty() {
        output::print_workspace_start(0, &config);
        return Ok(());
    }

    let start = Instant::now();
    let reports = if targets.len() == 1 {
        let callbacks = output::SingleRepoCallbacks::new(
            output::create_single_repo_progress(&config),
            config.clone(),
        );
        vec![sync::sync_repo(&git, &targets[0], &callbacks, &config)]
    } else {
        output::print_workspace_start(targets.len(), &config);
        let progress = output::create_workspace_progress(targets.len(), &config);
        let reports = sync::sync_workspace(
            &git,
            &targets,
            |path| progress.create_repo_tracker(repo::repo_name(path), config.clone()),
            &config,
        );
        progress.finish();
        reports
    };

    output::print_summary(&reports, start.elapsed(), &config);

    if any_failed(&reports) {
        std::process::exit(1);
    }
    Ok(())
}

fn any_failed(reports: &[SyncReport]) -> bool {
    reports
        .iter()
        .any(|r| matches!(r.outcome, SyncOutcome::Failed(_)))
}
