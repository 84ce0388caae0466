//! SubCtl - Sub-Agent Monitoring CLI
//!
//! The `subctl` command shows the live state autonomous worker agents
//! publish into the shared store.
//!
//! ## Commands
//!
//! - `agents list`: table of active agents, once or continuously (`--watch`)
//! - `agents inspect`: identity block and detail sections for one agent

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use subctl_core::{
    EntryPolicy, InspectOutcome, InspectSections, MonitorConfig, Presenter,
    DEFAULT_MAX_AGE_MINUTES, MAX_AGE_LIMIT_MINUTES,
};
use subctl_store::{AgentStore, RedisConfig, RedisStore};
use tokio::sync::watch;
use tracing::{warn, Level};

#[derive(Parser)]
#[command(name = "subctl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "SubCtl - Sub-Agent Management CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Store host
    #[arg(long, global = true, env = "SUBCTL_REDIS_HOST", default_value = "localhost")]
    redis_host: String,

    /// Store port
    #[arg(long, global = true, env = "SUBCTL_REDIS_PORT", default_value_t = 6379)]
    redis_port: u16,

    /// Store database index
    #[arg(
        long,
        global = true,
        env = "SUBCTL_REDIS_DB",
        default_value_t = 0,
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    redis_db: i64,

    /// Agents silent for longer than this many minutes are not active
    #[arg(
        long,
        global = true,
        env = "SUBCTL_MAX_AGE_MINUTES",
        default_value_t = DEFAULT_MAX_AGE_MINUTES,
        value_parser = clap::value_parser!(i64).range(0..=MAX_AGE_LIMIT_MINUTES)
    )]
    max_age_minutes: i64,

    /// Treat one malformed agent entry as an unreadable snapshot
    #[arg(long, global = true, env = "SUBCTL_STRICT_DECODE")]
    strict_decode: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Agent management
    Agents {
        #[command(subcommand)]
        action: Option<AgentsAction>,
    },
}

#[derive(Subcommand)]
enum AgentsAction {
    /// List all agents
    List {
        /// Real-time monitoring
        #[arg(long)]
        watch: bool,

        /// Refresh interval (seconds)
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
        refresh: u64,

        /// Include stale/historical data
        #[arg(long)]
        stale: bool,
    },

    /// Inspect specific agent
    Inspect {
        /// Agent label to inspect
        label: String,

        /// Show logs
        #[arg(long)]
        logs: bool,

        /// Show tool calls
        #[arg(long)]
        tools: bool,

        /// Show token usage
        #[arg(long)]
        tokens: bool,

        /// Show package compliance
        #[arg(long)]
        packages: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    subctl_core::init_tracing(cli.json, level);

    let config = monitor_config(&cli)?;
    let action = match cli.command {
        None => {
            Cli::command().print_help()?;
            return Ok(());
        }
        Some(Commands::Agents { action: None }) => {
            print!("{}", agents_help());
            return Ok(());
        }
        Some(Commands::Agents {
            action: Some(action),
        }) => action,
    };

    let store = RedisStore::open(config.store.clone())
        .with_context(|| format!("Failed to create store client for {}", config.store.endpoint()))?;
    let store: Arc<dyn AgentStore> = Arc::new(store);
    let presenter = Presenter::from_store(store, &config);
    let mut stdout = std::io::stdout().lock();

    match action {
        AgentsAction::List {
            watch: true,
            refresh,
            stale,
        } => {
            cmd_watch(
                &presenter,
                &mut stdout,
                stale,
                Duration::from_secs(refresh),
                interrupt_channel(),
            )
            .await
        }
        AgentsAction::List { stale, .. } => cmd_list(&presenter, &mut stdout, stale).await,
        AgentsAction::Inspect {
            label,
            logs,
            tools,
            tokens,
            packages,
        } => {
            let sections = InspectSections {
                logs,
                tools,
                tokens,
                packages,
            };
            cmd_inspect(&presenter, &mut stdout, &label, sections)
                .await
                .map(|_| ())
        }
    }
}

fn monitor_config(cli: &Cli) -> Result<MonitorConfig> {
    let entry_policy = if cli.strict_decode {
        EntryPolicy::Reject
    } else {
        EntryPolicy::Skip
    };
    let max_age = chrono::Duration::try_minutes(cli.max_age_minutes)
        .with_context(|| format!("Max age of {} minutes is out of range", cli.max_age_minutes))?;
    Ok(MonitorConfig::default()
        .with_store(RedisConfig::new(cli.redis_host.clone(), cli.redis_port).with_db(cli.redis_db))
        .with_max_age(max_age)
        .with_entry_policy(entry_policy))
}

/// Help text for the `agents` command group
fn agents_help() -> String {
    let mut cli_command = Cli::command();
    cli_command
        .find_subcommand_mut("agents")
        .map(|agents| agents.render_help().to_string())
        .unwrap_or_default()
}

/// Shutdown channel that turns true on the first Ctrl-C.
fn interrupt_channel() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(true);
            }
            Err(err) => {
                warn!(error = %err, "Interrupt handler unavailable; watch runs until killed");
                // Dropping the sender would stop the watch.
                std::future::pending::<()>().await;
            }
        }
    });
    rx
}

/// Show the agent table once
async fn cmd_list(presenter: &Presenter, out: &mut impl Write, stale: bool) -> Result<()> {
    presenter
        .list_once(out, stale)
        .await
        .context("Failed to write agent table")?;
    Ok(())
}

/// Show the agent table every `refresh` until interrupted
async fn cmd_watch(
    presenter: &Presenter,
    out: &mut impl Write,
    stale: bool,
    refresh: Duration,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    presenter
        .watch(out, stale, refresh, shutdown)
        .await
        .context("Failed to write agent table")?;
    Ok(())
}

/// Show one agent; an unknown label is reported, not an error
async fn cmd_inspect(
    presenter: &Presenter,
    out: &mut impl Write,
    label: &str,
    sections: InspectSections,
) -> Result<InspectOutcome> {
    presenter
        .inspect(out, label, sections)
        .await
        .with_context(|| format!("Failed to write details for agent {label}"))
}
