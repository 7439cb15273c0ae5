use clap::Parser;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

mod api;
mod config;
mod handler;
mod http;
mod logger;
mod routing;
mod server;
mod store;
mod validation;

use config::{AppState, Config};
use store::{Store, StoreError, SAMPLE_USERS};

/// User directory web service backed by SQLite
#[derive(Parser, Debug)]
#[command(name = "rust_userbook", version, about)]
struct Cli {
    /// Configuration file, without extension (toml, yaml or json)
    #[arg(long, default_value = "config")]
    config: String,

    /// Delete the database file before opening it
    #[arg(long)]
    reset_store: bool,

    /// Insert sample users when the table is empty
    #[arg(long)]
    seed: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut cfg = Config::load_from(&cli.config)?;
    cfg.store.reset_on_start |= cli.reset_store;
    cfg.store.seed_sample_data |= cli.seed;

    logger::init(&cfg)?;

    // Build the runtime with the configured worker count
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let store = open_store(&cfg).map_err(|e| {
        logger::log_error(&format!("Failed to open record store: {e}"));
        e
    })?;

    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let grace = Duration::from_secs(cfg.performance.shutdown_grace);
    let state = Arc::new(AppState::new(cfg, store));
    let active_connections = Arc::new(AtomicUsize::new(0));
    let shutdown = Arc::new(Notify::new());

    server::start_signal_handler(Arc::clone(&shutdown))?;

    server::start_server_loop(
        listener,
        Arc::clone(&state),
        Arc::clone(&active_connections),
        shutdown,
    )
    .await;

    let remaining = server::wait_for_drain(&active_connections, grace).await;
    if remaining > 0 {
        logger::log_warning(&format!(
            "Shutdown grace of {}s elapsed with {remaining} connections still open",
            grace.as_secs()
        ));
    }

    state.store.close()?;
    logger::log_info(&format!("Stopped; database {} closed", state.store.path().display()));
    Ok(())
}

/// Prepare the record store: optional destructive reset, open, optional seed
fn open_store(cfg: &Config) -> Result<Store, StoreError> {
    if cfg.store.reset_on_start {
        Store::remove_backing_file(&cfg.store.path)?;
    }

    let store = Store::open(&cfg.store.path, cfg.store.busy_timeout())?;

    if cfg.store.seed_sample_data {
        store.seed_if_empty(SAMPLE_USERS)?;
    }
    logger::log_info(&format!("Record store holds {} users", store.count()?));

    Ok(store)
}
