use clap::Parser;
use email_components_proxy::proxy_state::ProxyConfig;
use email_components_proxy::server;

#[derive(Parser, Debug)]
#[command(name = "email-components-proxy")]
#[command(about = "API proxy for the email components assistant")]
#[command(long_about = r#"
Keeps the completion-provider credential off the client: accepts chat
requests, injects the assistant system prompt, forwards the conversation to
the provider and maps failures to stable HTTP statuses.

The credential is read from the OPENAI_API_KEY environment variable. The
server starts without it, but /api/v1/chat then fails closed with a generic
unavailability error.
"#)]
struct CliArgs {
    /// Host address to bind the proxy server
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the proxy server
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Model identifier sent to the completion provider
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// Base URL of the completion provider
    #[arg(long, default_value = "https://api.openai.com")]
    upstream_url: String,

    /// Timeout for the upstream completion call, in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    /// Maximum accepted request body size in bytes
    #[arg(long, default_value_t = 10 * 1024 * 1024)]
    max_payload_size: usize,

    /// Allowed CORS origins; permissive when none are given
    #[arg(long, num_args = 0..)]
    cors_allowed_origins: Vec<String>,

    /// Requests allowed per client per rate-limit window
    #[arg(long, default_value_t = 20)]
    rate_limit_max_requests: u32,

    /// Rate-limit window length in seconds
    #[arg(long, default_value_t = 900)]
    rate_limit_window_secs: u64,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

fn main() -> std::io::Result<()> {
    let args = CliArgs::parse();
    let api_key = std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.is_empty());

    let config = ProxyConfig {
        host: args.host,
        port: args.port,
        model: args.model,
        upstream_url: args.upstream_url,
        api_key,
        request_timeout_secs: args.request_timeout_secs,
        max_payload_size: args.max_payload_size,
        cors_allowed_origins: args.cors_allowed_origins,
        rate_limit_max_requests: args.rate_limit_max_requests,
        rate_limit_window_secs: args.rate_limit_window_secs,
        verbose: args.verbose,
    };

    actix_web::rt::System::new().block_on(server::startup(config))
}
