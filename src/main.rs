//! # VNFCTL CLI
//!
//! Command-line interface for the VNF configuration catalogue.
//!
//! ## Usage
//!
//! ```bash
//! # Print the field catalogue of a document
//! vnfctl parse router.yaml
//!
//! # Ingest a document or an extracted bundle into the configured stores
//! vnfctl ingest router.yaml
//! vnfctl ingest ./bundles/router --name core-router
//!
//! # Dry run without databases
//! vnfctl ingest router.yaml --memory
//!
//! # List instances and their field records
//! vnfctl instances --keyword router
//! vnfctl records 12 --modified-only
//!
//! # Create missing instance mirrors
//! vnfctl reconcile
//!
//! # Check both stores
//! vnfctl status
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use vnf_config::config::AppConfig;
use vnf_config::parser::{group_fields, parse_file, validate};
use vnf_config::service::{DefinitionService, Ingestor, InstanceService};
use vnf_config::store::{
    DbDocumentStore, DbRelationalStore, DualStoreCoordinator, InstanceQuery, MemoryDocumentStore,
    MemoryRelationalStore, RecordQuery,
};

/// VNF configuration catalogue CLI
#[derive(Parser)]
#[command(name = "vnfctl")]
#[command(about = "VNF configuration catalogue CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a configuration document and print its field catalogue
    Parse {
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Print fields bucketed by group
        #[arg(long)]
        groups: bool,
    },
    /// Ingest a configuration document or an extracted bundle directory
    Ingest {
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Instance name (defaults to the file stem or directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Dry run against throwaway in-memory stores
        #[arg(long)]
        memory: bool,
    },
    /// List ingested instances, newest first
    Instances {
        #[arg(long, default_value_t = 1)]
        page: u64,

        #[arg(long, default_value_t = 10)]
        page_size: u64,

        /// Substring of the instance name
        #[arg(short, long)]
        keyword: Option<String>,
    },
    /// List the field records of an instance
    Records {
        #[arg(value_name = "VNF_ID")]
        vnf_id: i64,

        #[arg(long, default_value_t = 1)]
        page: u64,

        #[arg(long, default_value_t = 10)]
        page_size: u64,

        /// Only records whose current value differs from the default
        #[arg(long)]
        modified_only: bool,
    },
    /// Create minimal mirrors for instances that have none
    Reconcile,
    /// Report reachability of both stores
    Status {
        /// Check throwaway in-memory stores instead of the databases
        #[arg(long)]
        memory: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{text}");
    Ok(())
}

/// In-memory stores live only as long as the process
async fn coordinator(config: &AppConfig, memory: bool) -> Result<DualStoreCoordinator> {
    if memory {
        info!("Using in-memory stores");
        return Ok(DualStoreCoordinator::new(
            Arc::new(MemoryRelationalStore::new()),
            Arc::new(MemoryDocumentStore::new()),
            config.timeouts(),
        ));
    }

    let relational = DbRelationalStore::new(&config.relational_database_url).await?;
    let document = DbDocumentStore::new(&config.document_database_url).await?;
    Ok(DualStoreCoordinator::new(
        Arc::new(relational),
        Arc::new(document),
        config.timeouts(),
    ))
}

async fn parse_command(path: &Path, groups: bool) -> Result<()> {
    let parsed = parse_file(path)
        .await
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    for warning in validate(&parsed) {
        eprintln!("warning: {warning}");
    }
    if groups {
        print_json(&group_fields(&parsed))
    } else {
        print_json(&parsed)
    }
}

async fn ingest_command(coordinator: DualStoreCoordinator, path: &Path, name: Option<&str>) -> Result<()> {
    let ingestor = Ingestor::new(coordinator);
    let result = if path.is_dir() {
        ingestor.ingest_bundle_dir(name, path).await
    } else {
        ingestor.ingest_file(name, path).await
    };
    let report = result.with_context(|| format!("Failed to ingest {}", path.display()))?;

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    print_json(&report)
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is not an error
    let env_file = dotenvy::dotenv();
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with_writer(std::io::stderr)
        .init();
    if let Ok(path) = env_file {
        info!("Loaded environment from {}", path.display());
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { path, groups } => parse_command(&path, groups).await,
        Commands::Ingest { path, name, memory } => {
            let coordinator = coordinator(&config, memory).await?;
            ingest_command(coordinator, &path, name.as_deref()).await
        }
        Commands::Instances {
            page,
            page_size,
            keyword,
        } => {
            let service = InstanceService::new(coordinator(&config, false).await?);
            let listing = service
                .list(InstanceQuery {
                    page,
                    page_size,
                    keyword,
                })
                .await
                .context("Failed to list instances")?;
            print_json(&listing)
        }
        Commands::Records {
            vnf_id,
            page,
            page_size,
            modified_only,
        } => {
            let service = DefinitionService::new(coordinator(&config, false).await?);
            let listing = service
                .list(RecordQuery {
                    vnf_id,
                    page,
                    page_size,
                    modified_only,
                })
                .await
                .with_context(|| format!("Failed to list records of instance {vnf_id}"))?;
            print_json(&listing)
        }
        Commands::Reconcile => {
            let coordinator = coordinator(&config, false).await?;
            let report = coordinator
                .reconcile()
                .await
                .context("Mirror reconciliation failed")?;
            print_json(&report)
        }
        Commands::Status { memory } => {
            let coordinator = coordinator(&config, memory).await?;
            print_json(&coordinator.status().await)
        }
    }
}
