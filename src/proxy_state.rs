use crate::io_struct::ChatMessage;
use crate::upstream::{self, UpstreamError};

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    /// Model identifier sent with every completion request.
    pub model: String,
    /// Base URL of the completion provider.
    pub upstream_url: String,
    /// Server-side credential; the chat route fails closed when absent.
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub max_payload_size: usize,
    /// Allowed cross-origin callers; permissive CORS when empty.
    pub cors_allowed_origins: Vec<String>,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
    pub verbose: bool,
}

pub struct AppState {
    pub config: ProxyConfig,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(AppState { config, client })
    }

    /// One completion round trip with the configured model and provider.
    pub async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<String, UpstreamError> {
        upstream::complete(
            &self.client,
            &self.config.upstream_url,
            api_key,
            &self.config.model,
            messages,
        )
        .await
    }
}
