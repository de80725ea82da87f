//! Upstream completion API module
//!
//! One call per invocation: no retry, no streaming, no timeout override.

mod client;
mod error;
mod transport;
mod types;

pub use client::UpstreamClient;
pub use error::UpstreamError;
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::ChatMessage;

#[cfg(test)]
pub use client::testing;
#[cfg(test)]
pub use types::ChatRole;
