use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

mod config;
mod handler;
mod http;
mod logger;
mod prompts;
mod server;
mod upstream;

use upstream::ReqwestTransport;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; the credential may come from the real environment
    dotenvy::dotenv().ok();

    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let api_key = cfg.read_api_key();
    logger::log_server_start(&addr, &cfg, api_key.is_some());

    let shutdown_timeout = Duration::from_secs(cfg.performance.shutdown_timeout);
    let state = Arc::new(config::AppState::new(&cfg, api_key, ReqwestTransport::new()));
    let active_connections = Arc::new(AtomicUsize::new(0));

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    // Use LocalSet for spawn_local support; connection tasks die with it, so drain inside
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            server::start_server_loop(
                listener,
                state,
                Arc::clone(&active_connections),
                Arc::clone(&signals.shutdown),
            )
            .await;
            server::drain_connections(&active_connections, shutdown_timeout).await;
        })
        .await;

    Ok(())
}
