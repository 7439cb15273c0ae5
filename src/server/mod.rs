// Server module entry
// Listener setup, connection handling, signals and graceful shutdown

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use server_loop::{start_server_loop, wait_for_drain};
pub use signal::start_signal_handler;
