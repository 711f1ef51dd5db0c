use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use twig::areas::repository::Repository;
use twig::artifacts::status::status_report::StatusReport;
use twig::commands::porcelain::commit::CommitSummary;
use twig::commands::porcelain::log::LogEntry;
use twig::commands::porcelain::merge::MergeOutcome;
use twig::config::RepositoryConfig;
use twig::error::{ErrorKind, RepositoryError};

const LOG_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y %z";

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A small content-addressed version-control system",
    long_about = "twig keeps snapshots of a working tree in a .twig directory. \
    It supports branches, checkouts of whole snapshots or single files, \
    and three-way merges with conflict markers.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "Creates the .twig directory in the current directory or at the given path. \
        HEAD points at an unborn master branch until the first commit."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(name = "add", about = "Stage a file for the next commit")]
    Add {
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "rm",
        about = "Unstage a file, or stage the removal of a tracked file"
    )]
    Rm {
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(name = "commit", about = "Record the staged changes")]
    Commit {
        #[arg(index = 1, help = "The commit message")]
        message: String,
    },
    #[command(name = "log", about = "Show the history of the current branch")]
    Log,
    #[command(name = "global-log", about = "Show every commit ever made")]
    GlobalLog,
    #[command(name = "find", about = "Print the IDs of commits with the given message")]
    Find {
        #[arg(index = 1)]
        message: String,
    },
    #[command(name = "status", about = "Show branches, staged files and working tree changes")]
    Status,
    #[command(
        name = "checkout",
        about = "Switch branches or restore a file",
        long_about = "checkout <branch> switches to a branch. \
        checkout -- <file> restores a file from HEAD. \
        checkout <commit> -- <file> restores a file from the given commit."
    )]
    Checkout {
        #[arg(index = 1, help = "Branch name, or commit ID when a file is given")]
        target: Option<String>,
        #[arg(index = 2, last = true, help = "The file to restore")]
        file: Option<PathBuf>,
    },
    #[command(name = "branch", about = "Create a branch at the current commit")]
    Branch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(name = "rm-branch", about = "Delete a branch ref")]
    RmBranch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(
        name = "reset",
        about = "Move the current branch and working tree to a commit"
    )]
    Reset {
        #[arg(index = 1)]
        commit_id: String,
    },
    #[command(name = "merge", about = "Merge a branch into the current branch")]
    Merge {
        #[arg(index = 1)]
        branch: String,
    },
}

fn main() -> ExitCode {
    twig::telemetry::init();
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(&error),
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    let pwd = std::env::current_dir()?;

    match command {
        Commands::Init { path } => {
            let root = match path {
                Some(path) => pwd.join(path),
                None => pwd,
            };
            open(root)?.init()?;
        }
        Commands::Add { file } => open(pwd)?.add(&file)?,
        Commands::Rm { file } => open(pwd)?.rm(&file)?,
        Commands::Commit { message } => print_commit(&open(pwd)?.commit(&message)?),
        Commands::Log => print_log(&open(pwd)?.log()?),
        Commands::GlobalLog => print_log(&open(pwd)?.global_log()?),
        Commands::Find { message } => {
            for oid in open(pwd)?.find(&message)? {
                println!("{oid}");
            }
        }
        Commands::Status => print_status(&open(pwd)?.status()?),
        Commands::Checkout { target, file } => {
            let repository = open(pwd)?;
            match (target, file) {
                (Some(commit_id), Some(file)) => repository.checkout_file(&commit_id, &file)?,
                (None, Some(file)) => repository.checkout_head_file(&file)?,
                (Some(branch), None) => repository.checkout_branch(&branch)?,
                (None, None) => anyhow::bail!("checkout needs a branch or `-- <file>`"),
            }
        }
        Commands::Branch { name } => open(pwd)?.branch(&name)?,
        Commands::RmBranch { name } => open(pwd)?.remove_branch(&name)?,
        Commands::Reset { commit_id } => open(pwd)?.reset(&commit_id)?,
        Commands::Merge { branch } => print_merge(&open(pwd)?.merge(&branch)?),
    }

    Ok(())
}

fn open(root: PathBuf) -> anyhow::Result<Repository> {
    Ok(Repository::new(RepositoryConfig::load_from_env(root)?))
}

/// Print the failure and pick the exit code
///
/// Named user-facing failures go to stdout verbatim with code 1; anything
/// else is an internal error on stderr with code 2.
fn report(error: &anyhow::Error) -> ExitCode {
    match RepositoryError::find(error) {
        Some(repository_error)
            if matches!(
                repository_error.kind(),
                ErrorKind::UserInput | ErrorKind::Precondition
            ) =>
        {
            println!("{repository_error}");
            ExitCode::from(1)
        }
        _ => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}

fn print_commit(summary: &CommitSummary) {
    let root_marker = if summary.is_root { " (root-commit)" } else { "" };
    let short_message = summary.message.lines().next().unwrap_or("");

    println!(
        "[{}{} {}] {}",
        summary.branch,
        root_marker,
        summary.oid.to_short_oid(),
        short_message
    );
}

fn print_log(entries: &[LogEntry]) {
    for entry in entries {
        println!("===");
        println!("{}", format!("commit {}", entry.oid).yellow());
        if entry.is_merge() {
            let parents = entry
                .commit
                .parents()
                .iter()
                .map(|parent| parent.to_short_oid())
                .collect::<Vec<_>>();
            println!("Merge: {}", parents.join(" "));
        }
        println!("Date: {}", entry.commit.timestamp().format(LOG_DATE_FORMAT));
        println!("{}", entry.commit.message());
        println!();
    }
}

fn print_status(report: &StatusReport) {
    println!("=== Branches ===");
    for branch in &report.branches {
        if report.is_current(branch) {
            println!("{}", format!("*{branch}").green());
        } else {
            println!("{branch}");
        }
    }
    println!();

    println!("=== Staged Files ===");
    for path in &report.staged {
        println!("{}", path.display());
    }
    println!();

    println!("=== Removed Files ===");
    for path in &report.removed {
        println!("{}", path.display());
    }
    println!();

    println!("=== Modifications Not Staged For Commit ===");
    for (path, change) in &report.unstaged {
        println!("{} ({change})", path.display());
    }
    println!();

    println!("=== Untracked Files ===");
    for path in &report.untracked {
        println!("{}", path.display());
    }
    println!();
}

fn print_merge(outcome: &MergeOutcome) {
    match outcome {
        MergeOutcome::AlreadyUpToDate => {
            println!("Given branch is an ancestor of the current branch.");
        }
        MergeOutcome::FastForward { .. } => println!("Current branch fast-forwarded."),
        MergeOutcome::Merged { .. } if outcome.has_conflicts() => {
            println!("Encountered a merge conflict.");
        }
        MergeOutcome::Merged { .. } => {}
    }
}
