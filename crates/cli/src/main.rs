use analyzer_cli::{
    await_terminal, BranchPageFetcher, ClientConfig, HttpStatusFetcher, RepoRef,
};
use analyzer_pager::PagedCollector;
use analyzer_protocol::{PollTarget, TaskStatus, TaskStatusReport};
use analyzer_watcher::{LogNotifier, QueryCache, TaskWatcher};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "analyzer")]
#[command(about = "Watch analyzer tasks and list repository branches", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Analyzer backend URL (overrides ANALYZER_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll a task until it completes or fails and print the final report
    Watch {
        #[arg(long)]
        task_id: String,

        #[arg(long)]
        user_id: String,

        /// Poll interval in milliseconds (overrides ANALYZER_POLL_INTERVAL_MS)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// List every branch of a GitHub repository
    Branches {
        #[arg(long)]
        owner: String,

        #[arg(long)]
        repo: String,

        /// Retries per failing page (overrides ANALYZER_PAGE_RETRIES)
        #[arg(long)]
        retries: Option<u32>,
    },

    /// Print the JSON schema of a task status report
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = ClientConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    match cli.command {
        Commands::Watch {
            task_id,
            user_id,
            interval_ms,
        } => {
            if let Some(ms) = interval_ms.filter(|ms| *ms > 0) {
                config.poll_interval = Duration::from_millis(ms);
            }
            let report = watch(&config, PollTarget::new(task_id, user_id)).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.status == TaskStatus::Failed {
                bail!("Task finished with status {}", report.status);
            }
        }
        Commands::Branches {
            owner,
            repo,
            retries,
        } => {
            if let Some(retries) = retries {
                config.page_retries = retries;
            }
            branches(&config, RepoRef::new(owner, repo)).await?;
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(TaskStatusReport);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

async fn watch(config: &ClientConfig, target: PollTarget) -> Result<TaskStatusReport> {
    let client = config.http_client()?;
    let watcher = TaskWatcher::new(
        config.watcher_config(),
        Arc::new(HttpStatusFetcher::new(client, config.base_url.clone())),
        Arc::new(QueryCache::new()),
        Arc::new(LogNotifier),
    );

    let mut updates = watcher.subscribe_updates();
    watcher.start(target.clone());
    let health = watcher.health_snapshot();
    if health.rejected_starts > 0 {
        let reason = health
            .last_error
            .unwrap_or_else(|| "invalid target".to_string());
        bail!("Cannot watch task: {reason}");
    }
    log::info!(
        "Watching task {} every {}ms",
        target.task_id,
        config.poll_interval.as_millis()
    );

    await_terminal(&watcher, &mut updates, tokio::signal::ctrl_c()).await
}

async fn branches(config: &ClientConfig, repo: RepoRef) -> Result<()> {
    let client = config.http_client()?;
    let fetcher = BranchPageFetcher::new(
        client,
        config.github_api_url.clone(),
        config.github_token.clone(),
    );

    let default_branch = match fetcher.default_branch(&repo).await {
        Ok(name) => Some(name),
        Err(err) => {
            log::warn!("Default branch lookup for {repo} failed: {err}");
            None
        }
    };

    let collector = PagedCollector::with_config(fetcher, config.collector_config())
        .with_notifier(Arc::new(LogNotifier));
    let result = collector.collect(&repo).await;

    let summary = json!({
        "repository": repo.to_string(),
        "default_branch": default_branch,
        "branches": result.items,
        "truncated": result.truncated,
        "error": result.error.as_ref().map(ToString::to_string),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to render branch listing")?
    );
    Ok(())
}
