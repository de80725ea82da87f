// Completion client
// Builds the upstream payload, issues exactly one call, and interprets the reply

use super::error::UpstreamError;
use super::transport::{HttpTransport, UpstreamReply};
use super::types::{ChatMessage, CompletionRequest, CompletionResponse};
use crate::config::UpstreamConfig;
use crate::logger;

/// Client for the chat completion endpoint
pub struct UpstreamClient<T> {
    transport: T,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl<T: HttpTransport> UpstreamClient<T> {
    pub fn new(transport: T, config: &UpstreamConfig) -> Self {
        Self {
            transport,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    #[cfg(test)]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one completion and return the first choice's text, trimmed.
    ///
    /// Fails with `MissingCredential` before any network I/O when `api_key` is `None`.
    pub async fn complete(
        &self,
        api_key: Option<&str>,
        messages: Vec<ChatMessage>,
    ) -> Result<String, UpstreamError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let reply = self.send(api_key, &request).await?;

        let content = serde_json::from_str::<CompletionResponse>(&reply.body)
            .ok()
            .and_then(CompletionResponse::first_content)
            .ok_or(UpstreamError::InvalidFormat)
            .inspect_err(|e| logger::log_error(&format!("Upstream call failed: {e}")))?;

        Ok(content.trim().to_string())
    }

    /// Forward a caller-supplied conversation and return the upstream JSON untouched
    pub async fn chat_raw(
        &self,
        api_key: Option<&str>,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<serde_json::Value, UpstreamError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature,
            max_tokens,
        };

        let reply = self.send(api_key, &request).await?;
        serde_json::from_str(&reply.body).map_err(|_| {
            logger::log_error("Upstream returned a non-JSON body");
            UpstreamError::InvalidFormat
        })
    }

    /// Shared path: credential check, the call itself, status check
    async fn send(
        &self,
        api_key: Option<&str>,
        request: &CompletionRequest,
    ) -> Result<UpstreamReply, UpstreamError> {
        logger::log_outbound_messages(&request.messages);

        let Some(api_key) = api_key else {
            let err = UpstreamError::MissingCredential;
            logger::log_error(&format!("Upstream call failed: {err}"));
            return Err(err);
        };

        let reply = self
            .transport
            .post_json(&self.endpoint, api_key, request)
            .await
            .inspect_err(|e| logger::log_error(&format!("Upstream call failed: {e}")))?;

        logger::log_upstream_status(reply.status);

        if !reply.is_success() {
            logger::log_error(&format!("Upstream error response: {}", reply.body));
            return Err(UpstreamError::Status {
                status: reply.status,
                body: reply.body,
            });
        }

        logger::log_upstream_payload(&reply.body);
        Ok(reply)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StubTransport;
    use super::*;

    fn upstream_config() -> UpstreamConfig {
        UpstreamConfig {
            endpoint: "https://api.deepseek.com/v1/chat/completions".to_string(),
            model: "deepseek-chat".to_string(),
            temperature: 0.3,
            max_tokens: 700,
            api_key_env: "DEEPSEEK_API_KEY".to_string(),
        }
    }

    fn two_messages() -> Vec<ChatMessage> {
        vec![ChatMessage::system("sys"), ChatMessage::user("task")]
    }

    #[tokio::test]
    async fn test_complete_returns_trimmed_content() {
        let client = UpstreamClient::new(
            StubTransport::with_content("  A summary.\n"),
            &upstream_config(),
        );
        let result = client.complete(Some("sk-1"), two_messages()).await;
        assert_eq!(result.unwrap(), "A summary.");

        let calls = client.transport().calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (url, bearer, payload) = &calls[0];
        assert_eq!(url, "https://api.deepseek.com/v1/chat/completions");
        assert_eq!(bearer, "sk-1");
        assert_eq!(payload.model, "deepseek-chat");
        assert_eq!(payload.max_tokens, 700);
        assert_eq!(payload.messages, two_messages());
    }

    #[tokio::test]
    async fn test_missing_credential_skips_network() {
        let client = UpstreamClient::new(StubTransport::with_content("x"), &upstream_config());
        let err = client.complete(None, two_messages()).await.unwrap_err();
        assert_eq!(err, UpstreamError::MissingCredential);
        assert_eq!(err.to_string(), "DeepSeek API key not configured");
        assert_eq!(client.transport().call_count(), 0);
    }

    #[tokio::test]
    async fn test_error_status_carries_code_and_body() {
        let client = UpstreamClient::new(
            StubTransport::replying(401, "Authentication Fails"),
            &upstream_config(),
        );
        let err = client.complete(Some("bad"), two_messages()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "DeepSeek API error: 401 - Authentication Fails"
        );
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        for body in ["not json", "{}", r#"{"choices":[]}"#, r#"{"choices":[{"message":{"content":""}}]}"#] {
            let client = UpstreamClient::new(StubTransport::replying(200, body), &upstream_config());
            let err = client.complete(Some("k"), two_messages()).await.unwrap_err();
            assert_eq!(err, UpstreamError::InvalidFormat, "body: {body}");
            assert_eq!(err.to_string(), "Invalid response format from DeepSeek");
        }
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let client = UpstreamClient::new(
            StubTransport::failing("error sending request: connection refused"),
            &upstream_config(),
        );
        let err = client.complete(Some("k"), two_messages()).await.unwrap_err();
        assert_eq!(err.to_string(), "error sending request: connection refused");
    }

    #[tokio::test]
    async fn test_chat_raw_uses_caller_parameters() {
        let client = UpstreamClient::new(
            StubTransport::replying(200, r#"{"choices":[],"usage":{"total_tokens":3}}"#),
            &upstream_config(),
        );
        let value = client
            .chat_raw(Some("k"), two_messages(), 0.9, 500)
            .await
            .unwrap();
        assert_eq!(value["usage"]["total_tokens"], 3);

        let calls = client.transport().calls.lock().unwrap();
        assert!((calls[0].2.temperature - 0.9).abs() < f32::EPSILON);
        assert_eq!(calls[0].2.max_tokens, 500);
    }
}
