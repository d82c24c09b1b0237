//! commitlens - CLI entry point.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commitlens::github::{Listing, ListingStatus, PageRequest};
use commitlens::{Config, Pipeline};

/// List GitHub repositories and commits, and get feedback on commit messages.
#[derive(Parser, Debug)]
#[command(name = "commitlens")]
#[command(about = "Get AI feedback on your GitHub commit messages")]
#[command(version)]
struct Cli {
    /// GitHub token (overrides GITHUB_ACCESS_TOKEN, GITHUB_TOKEN, GH_TOKEN and gh CLI)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether the GitHub token is accepted
    Check,

    /// Show the authenticated GitHub profile
    Whoami,

    /// List your repositories
    Repos {
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// List commits of one of your repositories
    Commits {
        /// Repository name (owned by the authenticated user)
        repo: String,

        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Ask Gemini for feedback on a repository's commit messages
    Analyze {
        /// Repository name (owned by the authenticated user)
        repo: String,

        #[command(flatten)]
        paging: PagingArgs,
    },
}

#[derive(clap::Args, Debug)]
struct PagingArgs {
    /// First page to fetch (defaults to 1)
    #[arg(long)]
    page: Option<u32>,

    /// Page size, at most 30 (defaults to 30)
    #[arg(long)]
    per_page: Option<u32>,
}

impl PagingArgs {
    fn request(&self) -> PageRequest {
        PageRequest::from_parts(self.page, self.per_page)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Step 1: Load configuration once
    let config = Config::from_env(cli.token.as_deref()).context("Failed to load configuration")?;
    let pipeline = Pipeline::from_config(&config).context("Failed to set up API clients")?;

    match cli.command {
        Command::Check => {
            let valid = pipeline
                .validate_credential()
                .await
                .context("Could not reach GitHub")?;
            if valid {
                println!("✓ Connected to GitHub");
            } else {
                bail!("GitHub rejected the token. Please check it and try again.");
            }
        }
        Command::Whoami => {
            let profile = pipeline.profile().await.context("Failed to load profile")?;
            println!("{}", profile.login);
            if let Some(name) = profile.name {
                println!("Name:      {}", name);
            }
            if let Some(followers) = profile.followers {
                println!("Followers: {}", followers);
            }
            if let Some(following) = profile.following {
                println!("Following: {}", following);
            }
        }
        Command::Repos { paging } => {
            let account = pipeline
                .resolve_account()
                .await
                .context("Failed to resolve GitHub account")?;
            let listing = pipeline
                .list_repositories(&account, paging.request())
                .await
                .context("Invalid paging options")?;

            for repo in &listing.items {
                println!("{}", repo);
            }
            report_listing("repositories", &listing);
        }
        Command::Commits { repo, paging } => {
            let account = pipeline
                .resolve_account()
                .await
                .context("Failed to resolve GitHub account")?;
            let listing = pipeline
                .list_commits(&account, &repo, paging.request())
                .await
                .context("Invalid repository name or paging options")?;

            for commit in &listing.items {
                let subject = commit.message.lines().next().unwrap_or_default();
                let short_sha = commit
                    .sha
                    .as_deref()
                    .map(|s| s.chars().take(7).collect::<String>())
                    .unwrap_or_else(|| "-------".to_string());
                println!(
                    "{} {} {}",
                    short_sha,
                    commit.timestamp.format("%Y-%m-%d"),
                    subject
                );
            }
            report_listing("commits", &listing);
        }
        Command::Analyze { repo, paging } => {
            config
                .require_gemini_key()
                .context("Commit analysis needs a Gemini key")?;

            let account = pipeline
                .resolve_account()
                .await
                .context("Failed to resolve GitHub account")?;
            let listing = pipeline
                .list_commits(&account, &repo, paging.request())
                .await
                .context("Invalid repository name or paging options")?;
            report_listing("commits", &listing);

            if listing.is_empty() {
                println!("No commits found in {}/{}. Nothing to analyze.", account.login, repo);
                return Ok(());
            }

            eprintln!("Analyzing {} commits with Gemini...", listing.len());
            let report = pipeline
                .analyze_commits(&listing.items)
                .await
                .context("Failed to analyze commits")?;

            println!("{}", report.text);
            if report.commits_in_prompt < report.batch_size {
                eprintln!(
                    "Note: only the {} most recent of {} commits were analyzed.",
                    report.commits_in_prompt, report.batch_size
                );
            }
        }
    }

    Ok(())
}

/// Print a listing summary to stderr, flagging incomplete listings.
fn report_listing<T>(what: &str, listing: &Listing<T>) {
    eprintln!(
        "Loaded {} {} from {} page(s)",
        listing.len(),
        what,
        listing.pages_fetched
    );
    if listing.skipped > 0 {
        eprintln!("Skipped {} malformed or duplicate record(s)", listing.skipped);
    }
    if let ListingStatus::Truncated { page, reason } = &listing.status {
        eprintln!(
            "Warning: listing stopped early at page {} ({:?}); results may be incomplete.",
            page, reason
        );
    }
}
