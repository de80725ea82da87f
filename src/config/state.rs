// Application state module
// Immutable per-process state shared by every connection

use super::types::Config;
use crate::upstream::{HttpTransport, ReqwestTransport, UpstreamClient};

/// Application state
pub struct AppState<T = ReqwestTransport> {
    pub config: Config,
    /// Upstream credential, resolved once at startup; `None` when unset
    pub api_key: Option<String>,
    pub upstream: UpstreamClient<T>,
}

impl<T: HttpTransport> AppState<T> {
    pub fn new(config: &Config, api_key: Option<String>, transport: T) -> Self {
        Self {
            config: config.clone(),
            api_key,
            upstream: UpstreamClient::new(transport, &config.upstream),
        }
    }
}
