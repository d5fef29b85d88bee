use clap::Parser;
use inventory_alloc::alloc::{AllocationEngine, Clock, EngineConfig, SystemClock};
use inventory_alloc::config::{Cli, Commands, ServeArgs};
use inventory_alloc::db::InventoryDb;
use inventory_alloc::http::{AppState, build_router};
use inventory_alloc::import::{ImportFormat, import_file};
use inventory_alloc::inventory::InventoryStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
                return;
            }
            _ => warn!("signal handlers unavailable, falling back to ctrl-c"),
        }
    }
    let _ = tokio::signal::ctrl_c().await;
}

async fn serve(db: InventoryDb, args: ServeArgs) -> Result<(), BoxError> {
    let store: Arc<dyn InventoryStore> = Arc::new(db);
    let engine = AllocationEngine::new(store, &args.engine_config());
    let app = build_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!(
        addr = %listener.local_addr()?,
        similarity_threshold = args.similarity_threshold,
        "inventory-alloc listening"
    );

    let drain = Duration::from_millis(args.shutdown_drain_ms);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            info!(drain_ms = drain.as_millis() as u64, "shutdown requested");
            tokio::time::sleep(drain).await;
        })
        .await?;
    info!("inventory-alloc stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let db = InventoryDb::new(&cli.db)?;
    match cli.command {
        Commands::Serve(args) => serve(db, args).await,
        Commands::Import { file, format } => {
            let format = format.unwrap_or_else(|| ImportFormat::from_path(&file));
            let positions = import_file(&db, &file, format, SystemClock.today())?;
            println!("imported {} records", positions.len());
            Ok(())
        }
        Commands::Stats => {
            let engine = AllocationEngine::new(db, &EngineConfig::default());
            let stats = engine.category_stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}
