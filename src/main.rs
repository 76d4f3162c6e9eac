//! kubegraph - Kubernetes RBAC and workload relationship graphs
//!
//! Reads a snapshot or lists a live cluster, and prints renderer-ready
//! compound graph elements as JSON on stdout.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::{ConfigSubcommand, GraphArgs, GraphKind};
use kubegraph::config::ConfigLoader;

/// kubegraph - Kubernetes RBAC and workload relationship graphs
#[derive(Parser, Debug)]
#[command(name = "kubegraph")]
#[command(about = "Builds RBAC and workload relationship graphs from Kubernetes resources", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Write logs to a temporary file instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Service accounts, roles and bindings
    Access(GraphArgs),
    /// Controllers, pods, services and what they reference
    Workload(GraphArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = cli::init_logging(args.debug, args.log_file)?;
    if let Some(ref log_path) = log_file {
        eprintln!("Logs written to: {}", log_path.display());
    }

    match args.command {
        Command::Config { subcommand } => cli::handle_config_command(subcommand),
        Command::Version => {
            cli::display_version();
            Ok(())
        }
        Command::Access(graph_args) => run_graph(GraphKind::Access, graph_args).await,
        Command::Workload(graph_args) => run_graph(GraphKind::Workload, graph_args).await,
    }
}

async fn run_graph(kind: GraphKind, graph_args: GraphArgs) -> Result<()> {
    let config = ConfigLoader::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration: {:#}, using defaults", e);
        ConfigLoader::load_defaults()
    });
    tracing::debug!(
        "Configuration loaded: includeSystem={}, namespace={:?}",
        config.include_system,
        config.namespace
    );
    cli::handle_graph_command(kind, graph_args, config).await
}
