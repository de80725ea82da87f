// Outbound HTTP transport
// The completion client talks to the network only through `HttpTransport`

use std::future::Future;

use super::error::UpstreamError;
use super::types::CompletionRequest;

/// Raw upstream reply: status code and unparsed body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

impl UpstreamReply {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends one authenticated JSON POST and returns whatever came back.
///
/// Implementations must not interpret the status code; only transport-level
/// failures are reported as errors.
pub trait HttpTransport {
    fn post_json(
        &self,
        url: &str,
        bearer: &str,
        payload: &CompletionRequest,
    ) -> impl Future<Output = Result<UpstreamReply, UpstreamError>> + Send;
}

/// Production transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer: &str,
        payload: &CompletionRequest,
    ) -> Result<UpstreamReply, UpstreamError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(bearer)
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(UpstreamReply { status, body })
    }
}
