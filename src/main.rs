use anyhow::Result;
use clap::{Parser, Subcommand};
use shoal::{ClusterConfig, NodeId, ShoalDaemon, SqliteStorage};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shoal")]
#[command(about = "Loosely-coordinated distributed SQL cluster daemon")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Run {
        #[arg(short, long, default_value = "shoal.toml")]
        config: PathBuf,
        #[arg(short, long)]
        node_id: NodeId,
    },
    Init {
        #[arg(short, long, default_value = "shoal.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shoal=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config: config_path,
            node_id,
        } => {
            run_daemon(config_path, node_id).await?;
        }
        Commands::Init {
            config: config_path,
        } => {
            init_config(config_path)?;
        }
    }

    Ok(())
}

async fn run_daemon(config_path: PathBuf, node_id: NodeId) -> Result<()> {
    // A missing or malformed membership document is fatal; the node must
    // not come up with a partial view of the cluster.
    let config = ClusterConfig::load(&config_path)?;

    std::fs::create_dir_all(&config.data_dir)?;
    let storage = Arc::new(SqliteStorage::new(
        config.data_dir.join(format!("node-{}.db", node_id)),
    ));

    let daemon = Arc::new(ShoalDaemon::new(&config, node_id, storage)?);

    let daemon_clone = daemon.clone();
    let daemon_handle = tokio::spawn(async move {
        if let Err(e) = daemon_clone.run().await {
            error!("daemon error: {}", e);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("shutting down node {}...", node_id);
    daemon.shutdown();

    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), daemon_handle).await;

    Ok(())
}

fn init_config(config_path: PathBuf) -> Result<()> {
    if config_path.exists() {
        anyhow::bail!("config file already exists: {:?}", config_path);
    }

    let config = ClusterConfig::sample();
    config.save(&config_path)?;
    println!("Created config file: {:?}", config_path);
    println!("\nEdit the config file to:");
    println!("  - Set each node's host address");
    println!("  - Adjust listen and storage ports");
    println!("  - Tune heartbeat and election timings");
    println!("\nThen start one process per node: shoal run --node-id <id>");

    Ok(())
}
