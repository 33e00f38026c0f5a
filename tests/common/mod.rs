//! Shared helpers for integration tests

#![allow(dead_code)]

pub mod mock_upstream;

pub use mock_upstream::{MockUpstream, UpstreamMode, start_mock_upstream};

use email_components_proxy::proxy_state::ProxyConfig;

/// Proxy configuration pointed at a test upstream, with the production
/// defaults everywhere else.
pub fn test_config(api_key: Option<&str>, upstream_url: &str) -> ProxyConfig {
    ProxyConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        model: "gpt-4o-mini".to_string(),
        upstream_url: upstream_url.to_string(),
        api_key: api_key.map(str::to_string),
        request_timeout_secs: 5,
        max_payload_size: 10 * 1024 * 1024,
        cors_allowed_origins: vec![],
        rate_limit_max_requests: 20,
        rate_limit_window_secs: 900,
        verbose: false,
    }
}
