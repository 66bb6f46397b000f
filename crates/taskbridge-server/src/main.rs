//! Task bridge server
//!
//! Usage:
//!   taskbridge serve                          Serve the bridge on 127.0.0.1:3004
//!   taskbridge serve --bind 0.0.0.0:3004
//!   taskbridge exec clearCollection '"test_users"'
//!   taskbridge exec findDocuments '{"collection": "test_users"}'
//!
//! The database is configured through MONGO_PUBLIC_URL (and `.env`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use taskbridge_common::BridgeConfig;
use taskbridge_mongodb::TaskBridge;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "taskbridge")]
#[command(about = "MongoDB task bridge for end-to-end test runners")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the bridge over HTTP
    Serve {
        /// Address to bind to
        #[arg(short, long, default_value = "127.0.0.1:3004")]
        bind: SocketAddr,
    },
    /// Run a single task and print its result as JSON
    Exec {
        /// Task name (e.g. findDocuments or find)
        task: String,

        /// Task argument as JSON; omitted means null
        arg: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `exec` output stays machine-readable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Serve { bind } => serve(load_bridge()?, bind).await,
        Commands::Exec { task, arg } => exec(&task, arg.as_deref()).await,
    }
}

fn load_bridge() -> Result<TaskBridge> {
    let config = BridgeConfig::from_env()?;
    Ok(TaskBridge::new(config))
}

async fn serve(bridge: TaskBridge, bind: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    info!("Task bridge listening on http://{}", listener.local_addr()?);
    info!("Tasks: {}", bridge.task_names().join(", "));

    taskbridge_server::serve(listener, bridge, shutdown_signal()).await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn exec(task: &str, arg: Option<&str>) -> Result<()> {
    // Usage errors are reported before configuration is read
    taskbridge_server::parse_exec_args(task, arg)?;

    let bridge = load_bridge()?;
    let value = taskbridge_server::exec_once(&bridge, task, arg).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => tracing::error!("Unable to listen for shutdown signal: {}", err),
    }
}
