//! Replay engine: fans captured requests out over one pooled client.
//!
//! Every request gets its own task; parallelism on the wire is bounded by
//! a per-origin permit count and the client's connection pool. Results are
//! returned index-aligned with the input.
//!
//! # Module Structure
//!
//! - `client` - Shared client construction
//! - `limiter` - Per-origin in-flight cap
//! - `engine` - Dispatch and join
//! - `types` - Response and result types

mod client;
mod engine;
mod limiter;
mod types;

pub use client::ReplayClient;
pub use engine::replay_all;
pub use limiter::HostLimiter;
pub use types::{ReplayResponse, ReplayResult};
