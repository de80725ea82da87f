// Server loop module
// Accepts connections until a shutdown is signalled, then drains the ones in flight

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;
use crate::upstream::HttpTransport;

/// Poll interval while waiting for connections to close
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept loop.
///
/// Must run inside a `LocalSet`: connections are served with `spawn_local`.
/// Returns once shutdown is signalled; connection tasks only survive as long as
/// the `LocalSet` keeps being driven (see [`drain_connections`]).
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop<T: HttpTransport + 'static>(
    listener: TcpListener,
    state: Arc<AppState<T>>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = shutdown.notified() => {
                logger::log_shutdown();
                break;
            }
        }
    }
}

/// Wait until every open connection has closed or `timeout` elapses.
///
/// Must be awaited inside the same `LocalSet` as the accept loop so the
/// connection tasks keep running. Returns `true` when all connections closed.
pub async fn drain_connections(active_connections: &AtomicUsize, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 {
            logger::log_drain_complete();
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown deadline reached with {remaining} connection(s) still open"
            ));
            return false;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
