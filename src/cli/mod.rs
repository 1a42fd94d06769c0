//! Command-line interface.
//!
//! Thin layer over the engine: parses arguments, wires up the configured
//! collaborators, and prints results. All engine errors surface with
//! their dispatcher-facing messages; the process exits non-zero on any
//! non-recoverable error.

mod commit;
mod doctor;
mod orders;
mod preview;
mod unmerge;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::KonvoiConfig;
use crate::format::OutputFormat;
use crate::model::order::TransportOrder;
use crate::providers::{HttpDistanceProvider, HttpGeocoder};
use crate::store::{HttpOrderStore, InMemoryOrderStore, OrderStore};

/// Freight-dispatch merge tool
///
/// konvoi lets a dispatcher combine several independently placed
/// transport orders into one physical vehicle run: it composes the
/// multi-stop route, measures its road distance (with a deterministic
/// straight-line fallback), splits the negotiated price back across the
/// source orders, and commits the result atomically to the order store.
///
/// QUICK START:
///
///   konvoi orders                 # list mergeable orders
///   konvoi preview --draft m.toml # see route, distance, and cost split
///   konvoi commit --draft m.toml  # persist the merge
///   konvoi unmerge TR-1001        # reverse it later
///
/// A draft file describes the primary order, the donors with their
/// per-event ranks, and the price split. Previews are side-effect free —
/// edit the draft and preview again as often as needed.
#[derive(Parser)]
#[command(name = "konvoi")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'konvoi <command> --help' for more information on a specific command.")]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = crate::config::CONFIG_FILE)]
    pub config: PathBuf,

    /// Offline mode: read orders from a JSON file instead of the store
    /// service. Commits mutate only the in-process copy.
    #[arg(long, global = true, value_name = "FILE")]
    pub orders_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List orders available to merge (status `new`)
    Orders {
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one order with full fields
    Show {
        /// The order id, e.g. TR-1001
        order_id: String,

        /// Output format: text or json
        #[arg(long, default_value = "json")]
        format: OutputFormat,
    },

    /// Preview a merge draft: route, distance, cost split
    ///
    /// Side-effect free against the store. Writes a regenerable preview
    /// artifact under the configured artifacts directory unless
    /// --no-artifact is given.
    Preview {
        /// Path to the merge draft TOML file
        #[arg(long)]
        draft: PathBuf,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Skip writing the preview artifact
        #[arg(long)]
        no_artifact: bool,
    },

    /// Commit a merge draft atomically
    ///
    /// Re-validates donor availability immediately before the commit and
    /// refuses over-allocated cost splits. All-or-nothing: a failure
    /// leaves every order untouched.
    Commit {
        /// Path to the merge draft TOML file
        #[arg(long)]
        draft: PathBuf,
    },

    /// Reverse a committed merge
    ///
    /// Restores every donor to independent `new` status and clears the
    /// primary order's merge fields.
    Unmerge {
        /// The primary order id carrying the merge
        order_id: String,
    },

    /// Check configuration and depot table
    Doctor,
}

/// Parse arguments and run the selected command.
///
/// # Errors
/// Returns the first engine or I/O error; the binary prints it and exits
/// non-zero.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = KonvoiConfig::load(&cli.config)?;

    match &cli.command {
        Commands::Orders { format } => {
            let store = build_store(&cli, &config)?;
            orders::list(store.as_ref(), *format)
        }
        Commands::Show { order_id, format } => {
            let store = build_store(&cli, &config)?;
            orders::show(store.as_ref(), order_id, *format)
        }
        Commands::Preview {
            draft,
            format,
            no_artifact,
        } => {
            let store = build_store(&cli, &config)?;
            preview::run(store.as_ref(), &config, draft, *format, *no_artifact)
        }
        Commands::Commit { draft } => {
            let store = build_store(&cli, &config)?;
            commit::run(store.as_ref(), &config, draft)
        }
        Commands::Unmerge { order_id } => {
            let store = build_store(&cli, &config)?;
            unmerge::run(store.as_ref(), order_id)
        }
        Commands::Doctor => doctor::run(&cli.config, &config),
    }
}

/// Build the configured store backend: HTTP by default, in-memory when
/// --orders-file is given.
fn build_store(cli: &Cli, config: &KonvoiConfig) -> Result<Box<dyn OrderStore>> {
    if let Some(path) = &cli.orders_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read orders file '{}'", path.display()))?;
        let orders: Vec<TransportOrder> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse orders file '{}'", path.display()))?;
        return Ok(Box::new(InMemoryOrderStore::new(orders)));
    }

    let store = HttpOrderStore::new(
        config.store.base_url.clone(),
        Duration::from_secs(config.store.timeout_seconds),
    )
    .context("Failed to build the order-store client")?;
    Ok(Box::new(store))
}

/// Build the geocoder client from configuration.
pub(crate) fn build_geocoder(config: &KonvoiConfig) -> Result<HttpGeocoder> {
    HttpGeocoder::new(
        config.geocoding.endpoint.clone(),
        Duration::from_secs(config.geocoding.timeout_seconds),
    )
    .context("Failed to build the geocoding client")
}

/// Build the road-distance client from configuration.
pub(crate) fn build_distance_provider(config: &KonvoiConfig) -> Result<HttpDistanceProvider> {
    HttpDistanceProvider::new(
        config.distance.endpoint.clone(),
        Duration::from_secs(config.distance.timeout_seconds),
    )
    .context("Failed to build the road-distance client")
}
