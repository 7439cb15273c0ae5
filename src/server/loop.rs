// Server loop module
// Accepts connections until shutdown, then waits for in-flight ones to drain

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{watch, Notify};

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop until `shutdown` is notified.
///
/// Returning drops the listener, so no new connections are accepted while
/// the caller drains. Open connections are told to shut down gracefully.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) {
    let (drain_tx, drain_rx) = watch::channel(false);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                            drain_rx.clone(),
                        );
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => {
                logger::log_shutdown(active_connections.load(Ordering::SeqCst));
                drain_tx.send_replace(true);
                return;
            }
        }
    }
}

/// Wait until no connections remain or `grace` elapses; returns how many
/// were still open at the end
pub async fn wait_for_drain(active_connections: &AtomicUsize, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;
    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 || tokio::time::Instant::now() >= deadline {
            return remaining;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
