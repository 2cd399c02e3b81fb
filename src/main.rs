//! Agentic Wallet CLI
//!
//! Runs the demo agents against an in-process ledger, or drives the
//! dashboard simulation.

use agentic_wallet::agents::AgentStatus;
use agentic_wallet::simulation::RunState;
use agentic_wallet::{
    AccountId, AgentContext, AgentRegistry, BehaviorKind, Config, EventLog, FileKeyStore,
    InMemoryLedger, KeyStore, Result, Simulator, TransactionExecutor,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEMO_AGENTS: [(&str, &str, BehaviorKind); 4] = [
    ("agent-001", "Trader Alpha", BehaviorKind::Trader),
    ("agent-002", "Random Rex", BehaviorKind::RandomActor),
    ("agent-003", "Token Queen", BehaviorKind::TokenManager),
    ("agent-004", "Idle Watcher", BehaviorKind::Idle),
];

#[derive(Parser)]
#[command(name = "agentic-wallet")]
#[command(about = "Autonomous wallet agents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo agents until Ctrl-C
    Run {
        /// Stop after this many seconds
        #[arg(short, long)]
        duration: Option<u64>,

        /// Seed for reproducible agent decisions
        #[arg(long)]
        seed: Option<u64>,

        /// Seconds between status summaries
        #[arg(long, default_value_t = 30)]
        status_interval: u64,
    },

    /// Run dashboard simulation ticks and print the resulting state
    Simulate {
        /// Number of ticks
        #[arg(short, long, default_value_t = 10)]
        ticks: u32,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Extra agents to spawn and set running before the first tick
        #[arg(long, default_value_t = 0)]
        spawn: u32,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    // Load config, then layer AGENT_* variables on top
    let mut config = if let Some(config_path) = cli.config {
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| agentic_wallet::Error::Config(e.to_string()))?;
        serde_json::from_str(&content)
            .map_err(|e| agentic_wallet::Error::Config(e.to_string()))?
    } else {
        Config::default()
    };
    config.apply_env()?;
    config.validate()?;

    match cli.command {
        Commands::Run {
            duration,
            seed,
            status_interval,
        } => {
            run_agents(config, duration, seed, status_interval).await?;
        }
        Commands::Simulate { ticks, seed, spawn } => {
            run_simulation(ticks, seed, spawn)?;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

async fn run_agents(
    config: Config,
    duration: Option<u64>,
    seed: Option<u64>,
    status_interval: u64,
) -> Result<()> {
    tracing::info!(
        action_interval_ms = config.agent.action_interval_ms,
        max_retries = config.transactions.max_retries,
        keystore = %config.security.keystore_dir.display(),
        "Starting agents"
    );

    let ledger = Arc::new(InMemoryLedger::new());
    let executor = TransactionExecutor::new(ledger, config.transactions.clone());
    let keystore: Arc<dyn KeyStore> = Arc::new(FileKeyStore::from_config(&config.security));
    let events = EventLog::with_logging(&config.event_log, &config.logging);
    let context = AgentContext {
        executor: Arc::new(executor),
        keystore,
        events,
        settings: config.agent.clone(),
    };
    let registry = match seed {
        Some(seed) => AgentRegistry::with_seed(context, seed),
        None => AgentRegistry::new(context),
    };

    for (id, name, behavior) in DEMO_AGENTS {
        registry.create_agent(id, name, behavior).await?;
    }

    // Every agent starts funded and pays the others
    let agents = registry.get_all_agents().await;
    let addresses: Vec<AccountId> = agents.iter().filter_map(|a| a.public_key()).collect();
    for agent in &agents {
        agent.request_funding(config.agent.funding_amount).await?;
        if let Some(own) = agent.public_key() {
            let others = addresses.iter().filter(|a| **a != own).cloned().collect();
            agent.set_counterparties(others).await;
        }
    }

    registry.start_all_agents().await?;

    let deadline = async {
        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);
    let mut status_timer = tokio::time::interval(Duration::from_secs(status_interval.max(1)));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                break;
            }
            _ = &mut deadline => {
                tracing::info!("Run duration elapsed");
                break;
            }
            _ = status_timer.tick() => {
                log_statuses(&registry.get_all_agent_statuses().await);
            }
        }
    }

    registry.stop_all_agents().await?;

    let statuses = registry.get_all_agent_statuses().await;
    log_statuses(&statuses);
    println!("{}", serde_json::to_string_pretty(&statuses)?);
    Ok(())
}

fn log_statuses(statuses: &[AgentStatus]) {
    for status in statuses {
        tracing::info!(
            agent_id = %status.config.id,
            name = %status.config.name,
            behavior = %status.config.behavior,
            active = status.config.is_active,
            balance = ?status.account.as_ref().map(|a| a.balance),
            total_actions = status.total_actions,
            "Agent status"
        );
    }
}

fn run_simulation(ticks: u32, seed: Option<u64>, spawn: u32) -> Result<()> {
    let mut simulator = Simulator::new(seed);
    for _ in 0..spawn {
        let agent = simulator.spawn_agent();
        simulator.set_state(&agent.id, RunState::Running)?;
    }

    for _ in 0..ticks {
        simulator.tick();
    }

    tracing::info!(
        ticks = ticks,
        agents = simulator.state().agents.len(),
        transactions = simulator.state().transactions.len(),
        logs = simulator.state().logs.len(),
        "Simulation finished"
    );
    println!("{}", serde_json::to_string_pretty(simulator.state())?);
    Ok(())
}
