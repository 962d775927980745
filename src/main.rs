//! CLI entry point.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use todo2issue::config::Config;
use todo2issue::diff::LineStatus;
use todo2issue::error::Result;
use todo2issue::github::{CloseOutcome, CreateOutcome, GitHubClient};
use todo2issue::output::{self, OutputFormat};
use todo2issue::python::PythonSource;
use todo2issue::repo::GitRepo;
use todo2issue::scan::TodoScan;
use todo2issue::worktree;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todo2issue")]
#[command(author, version, about = "Turn todo annotations in Python diffs into GitHub issues")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the diff between two revisions and print the work items
    Scan {
        /// Path to the git repository
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Revision the diff starts from
        #[arg(long, default_value = "HEAD~1")]
        from: String,

        /// Revision the diff ends at
        #[arg(long, default_value = "HEAD")]
        to: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Scan the diff, then create and close the matching GitHub issues
    Sync {
        /// Path to the git repository
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Revision the diff starts from
        #[arg(long, default_value = "HEAD~1")]
        from: String,

        /// Revision the diff ends at
        #[arg(long, default_value = "HEAD")]
        to: String,

        /// Print planned actions without calling the API
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },

    /// List every annotation in the working tree
    List {
        /// Directory to walk
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Scan {
            repo,
            from,
            to,
            format,
        } => run_scan(&repo, &from, &to, format.into()),
        Commands::Sync {
            repo,
            from,
            to,
            dry_run,
        } => run_sync(&repo, &from, &to, dry_run).await,
        Commands::List { path, format } => run_list(&path, format.into()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run_scan(repo: &Path, from: &str, to: &str, format: OutputFormat) -> Result<ExitCode> {
    let git = GitRepo::open(repo)?;
    let diff_text = git.diff_text(from, to)?;
    let scan = TodoScan::new(&git, &PythonSource);
    let issues = scan.find_todos(&diff_text, from, to)?;
    println!("{}", output::format_issues(&issues, format));
    Ok(ExitCode::SUCCESS)
}

async fn run_sync(repo: &Path, from: &str, to: &str, dry_run: bool) -> Result<ExitCode> {
    let config = Config::load(repo)?;
    let git = GitRepo::open(repo)?;
    let diff_text = git.diff_text(from, to)?;
    let scan = TodoScan::new(&git, &PythonSource);
    let issues = scan.find_todos(&diff_text, from, to)?;

    if dry_run {
        for issue in &issues {
            let action = match issue.status {
                LineStatus::Deleted => "close",
                _ => "create",
            };
            println!(
                "would {action}: {} ({}:{})",
                issue.title, issue.file_name, issue.start_line
            );
        }
        println!("{} annotations found, nothing sent", issues.len());
        return Ok(ExitCode::SUCCESS);
    }

    let slug = git.slug()?;
    let sha = git.short_sha(to)?;
    let token = config.token()?;
    let client = GitHubClient::connect(slug, sha, token, config.line_break.clone()).await?;

    let mut created = 0usize;
    let mut already_open = 0usize;
    let mut closed = 0usize;
    let mut unmatched = 0usize;
    let mut failed = 0usize;
    for issue in &issues {
        match issue.status {
            LineStatus::Deleted => match client.close_issue(issue).await {
                Ok(CloseOutcome::Closed(_)) => closed += 1,
                Ok(CloseOutcome::NoMatch) | Ok(CloseOutcome::MultipleMatches) => unmatched += 1,
                Err(e) => {
                    error!(title = %issue.title, error = %e, "failed to close issue");
                    failed += 1;
                }
            },
            _ => match client.create_issue(issue).await {
                Ok(CreateOutcome::Created(_)) => created += 1,
                Ok(CreateOutcome::SkippedExisting) => already_open += 1,
                Err(e) => {
                    error!(title = %issue.title, error = %e, "failed to create issue");
                    failed += 1;
                }
            },
        }
    }

    println!(
        "{created} created, {already_open} already open, {closed} closed, \
         {unmatched} unmatched, {failed} failed"
    );
    if failed > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_list(path: &Path, format: OutputFormat) -> Result<ExitCode> {
    let todos = worktree::scan_worktree(path, &PythonSource)?;
    println!("{}", output::format_worktree(&todos, format));
    Ok(ExitCode::SUCCESS)
}
