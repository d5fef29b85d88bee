use crate::alloc::EngineConfig;
use crate::alloc::matcher::DEFAULT_SIMILARITY_THRESHOLD;
use crate::import::ImportFormat;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "inventory-alloc")]
#[command(about = "Allocate unissued contact records by topic")]
#[command(
    after_help = "Environment:\n  RUST_LOG                 Log filter (default: info)\n  INVENTORY_DB_PATH        Inventory database file\n  INVENTORY_LOG_JSON       Emit JSON logs"
)]
pub struct Cli {
    /// Inventory database file.
    #[arg(long, global = true, env = "INVENTORY_DB_PATH", default_value = "inventory.redb")]
    pub db: PathBuf,
    #[arg(long, global = true, env = "INVENTORY_LOG_JSON", default_value_t = false)]
    pub log_json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP service.
    Serve(ServeArgs),
    /// Append records from a JSON or CBOR file.
    Import {
        file: PathBuf,
        /// Defaults to the file extension (`.cbor`, otherwise JSON).
        #[arg(long, value_enum)]
        format: Option<ImportFormat>,
    },
    /// Print per-category totals as JSON.
    Stats,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, env = "INVENTORY_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,
    #[arg(
        long,
        env = "INVENTORY_SIMILARITY_THRESHOLD",
        default_value_t = DEFAULT_SIMILARITY_THRESHOLD,
        value_parser = parse_threshold
    )]
    pub similarity_threshold: f64,
    /// Grace period after the shutdown signal before the server stops.
    #[arg(long, env = "INVENTORY_SHUTDOWN_DRAIN_MS", default_value_t = 0)]
    pub shutdown_drain_ms: u64,
}

impl ServeArgs {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            similarity_threshold: self.similarity_threshold,
        }
    }
}

fn parse_threshold(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be within 0.0..=1.0, got {value}"))
    }
}
