//! Replay captured proxy history against its original targets.
//!
//! The pipeline is one-way: a capture file is parsed into raw requests,
//! each is rebuilt against its recorded URL (optionally with a single header
//! swapped, typically a session cookie or bearer token), and the whole batch
//! is dispatched concurrently over one pooled client.
//!
//! # Example
//!
//! ```no_run
//! use rift_replay::{build_requests, load_capture, replay_all, HeaderOverride};
//! use rift_replay::{ReplayClient, ReplayConfig};
//!
//! # async fn run() -> Result<(), rift_replay::ReplayError> {
//! let captured = load_capture("history.xml")?;
//! let header = HeaderOverride::parse("Cookie: session=low-privilege")?;
//! let requests = build_requests(captured, Some(&header))?;
//!
//! let client = ReplayClient::new(ReplayConfig::default())?;
//! for result in replay_all(&client, requests).await {
//!     if let Some(response) = result.response() {
//!         println!("{} {}", response.status_line(), result.request.url);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod replay;
pub mod report;
pub mod request;

pub use capture::{load_capture, CapturedRequest};
pub use config::{ConnectionPoolConfig, ReplayConfig};
pub use error::{ExchangeError, ReplayError};
pub use replay::{replay_all, ReplayClient, ReplayResponse, ReplayResult};
pub use report::{OutputFormat, ReplaySummary, Reporter};
pub use request::{build_requests, HeaderOverride, ReplayRequest};
