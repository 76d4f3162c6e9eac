//! Graph command handlers

use anyhow::{Context, Result};
use clap::Args;
use kubegraph::config::Config;
use kubegraph::graph::{self, BuildOptions, Elements};
use kubegraph::kube::Snapshot;
use kubegraph::models::{AccessInput, WorkloadInput};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Which graph to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Access,
    Workload,
}

/// Arguments shared by `access` and `workload`
#[derive(Args, Debug, Clone, Default)]
pub struct GraphArgs {
    /// Snapshot file: a record bundle or a List of API objects, JSON or YAML.
    /// Reads stdin when neither this nor --live is given.
    #[arg(long, short = 'i', conflicts_with = "live")]
    pub input: Option<PathBuf>,

    /// List resources from the current kube context
    #[arg(long)]
    pub live: bool,

    /// Keep system namespaces and hidden RBAC objects
    #[arg(long)]
    pub include_system: bool,

    /// Restrict namespaced resources to one namespace
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Single-line JSON without raw records
    #[arg(long)]
    pub compact: bool,

    /// Print node and edge counts to stderr
    #[arg(long)]
    pub stats: bool,
}

/// Resolve CLI flags on top of the loaded configuration
fn effective_config(mut config: Config, args: &GraphArgs) -> Config {
    if args.include_system {
        config.include_system = true;
    }
    if let Some(namespace) = &args.namespace {
        config.namespace = Some(namespace.clone());
    }
    if args.compact {
        config.output.pretty = false;
        config.output.include_raw = false;
    }
    config
}

/// Build and print one graph
pub async fn handle_graph_command(kind: GraphKind, args: GraphArgs, config: Config) -> Result<()> {
    let config = effective_config(config, &args);
    let filter = config.filter_options();
    let options: BuildOptions = config.build_options();

    let elements: Elements = match kind {
        GraphKind::Access => {
            let mut input = load_access_input(&args, &config).await?;
            warn_if_empty(input.is_empty(), kind);
            filter.apply_access(&mut input);
            graph::build_access_graph_with(&input, &options)
        }
        GraphKind::Workload => {
            let mut input = load_workload_input(&args, &config).await?;
            warn_if_empty(input.is_empty(), kind);
            filter.apply_workload(&mut input);
            graph::build_workload_graph_with(&input, &options)
        }
    };

    let stats = elements.stats();
    tracing::info!(
        "Built {:?} graph: {} nodes, {} edges",
        kind,
        stats.node_count,
        stats.edge_count
    );
    if args.stats {
        eprintln!(
            "{}",
            serde_json::to_string(&stats).context("Failed to serialize graph stats")?
        );
    }

    let json = elements
        .to_json(config.output.pretty)
        .context("Failed to serialize graph")?;
    println!("{}", json);
    Ok(())
}

/// An empty input usually means the wrong snapshot or kube context
fn warn_if_empty(empty: bool, kind: GraphKind) {
    if empty {
        tracing::warn!("No {:?} resources found in input, the graph will be empty", kind);
    }
}

async fn load_access_input(args: &GraphArgs, config: &Config) -> Result<AccessInput> {
    if args.live {
        return live_access_input(config).await;
    }
    read_snapshot(args.input.as_deref())?
        .into_access_input()
        .context("Snapshot is not valid access input")
}

async fn load_workload_input(args: &GraphArgs, config: &Config) -> Result<WorkloadInput> {
    if args.live {
        return live_workload_input(config).await;
    }
    read_snapshot(args.input.as_deref())?
        .into_workload_input()
        .context("Snapshot is not valid workload input")
}

#[cfg(feature = "cluster")]
async fn live_access_input(config: &Config) -> Result<AccessInput> {
    let client = kubegraph::kube::create_client().await?;
    kubegraph::kube::fetch_access_input(&client, config.namespace.as_deref()).await
}

#[cfg(feature = "cluster")]
async fn live_workload_input(config: &Config) -> Result<WorkloadInput> {
    let client = kubegraph::kube::create_client().await?;
    kubegraph::kube::fetch_workload_input(&client, config.namespace.as_deref()).await
}

#[cfg(not(feature = "cluster"))]
async fn live_access_input(_config: &Config) -> Result<AccessInput> {
    Err(anyhow::anyhow!(
        "--live requires kubegraph to be built with the `cluster` feature"
    ))
}

#[cfg(not(feature = "cluster"))]
async fn live_workload_input(_config: &Config) -> Result<WorkloadInput> {
    Err(anyhow::anyhow!(
        "--live requires kubegraph to be built with the `cluster` feature"
    ))
}

/// Read a snapshot from a file, or from stdin when no path is given
fn read_snapshot(path: Option<&Path>) -> Result<Snapshot> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?,
        None => {
            tracing::debug!("Reading snapshot from stdin");
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read snapshot from stdin")?;
            buf
        }
    };
    Snapshot::parse(&text).context("Failed to parse snapshot")
}
