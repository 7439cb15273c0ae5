// API module entry
// JSON endpoints: user collection and health probes

pub mod handlers;
pub mod health;
mod response;
