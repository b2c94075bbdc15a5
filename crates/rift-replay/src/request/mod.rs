//! Request building: raw message parsing, target rewriting and the header override.

mod builder;
mod header_override;
mod message;

pub use builder::{build_requests, ReplayRequest};
pub use header_override::HeaderOverride;
pub use message::{MessageError, RawHttpRequest};
