use crate::io_struct::{ChatRequest, ChatResponse, ErrorResponse};
use crate::logging::{self, LoggingConfig};
use crate::middleware::RateLimit;
use crate::prompt;
use crate::proxy_state::{AppState, ProxyConfig};
use crate::rate_limit::FixedWindowLimiter;
use crate::upstream::UpstreamError;
use actix_cors::Cors;
use actix_web::{Error, HttpRequest, HttpResponse, HttpServer, error, get, post, web};
use chrono::{SecondsFormat, Utc};
use futures_util::StreamExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info};

/// Returned when `message` is absent, null, or empty.
pub const MESSAGE_REQUIRED: &str = "Message is required";
/// Generic body for the missing-credential and quota-exhausted cases. Never
/// names the credential.
pub const SERVICE_UNAVAILABLE: &str = "Service temporarily unavailable";
/// Body for an upstream credential rejection; authentication detail stays
/// server-side.
pub const INVALID_API_CONFIGURATION: &str = "Invalid API configuration";
/// Body for an upstream 429.
pub const UPSTREAM_OVERLOADED: &str =
    "Service temporarily overloaded, please retry in a few minutes";
pub const INTERNAL_ERROR: &str = "Internal server error";
pub const NOT_FOUND: &str = "Endpoint not found";
/// Substituted when the provider returns an empty completion.
pub const FALLBACK_RESPONSE: &str = "Sorry, I was unable to generate a response.";

#[post("/api/v1/chat")]
pub async fn chat(req: web::Json<ChatRequest>, state: web::Data<AppState>) -> HttpResponse {
    let req = req.into_inner();
    let message = match req.message.as_deref().map(str::trim) {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => return HttpResponse::BadRequest().json(ErrorResponse::new(MESSAGE_REQUIRED)),
    };

    // Fail closed when no credential is configured; the caller only sees the
    // generic unavailability body.
    let Some(api_key) = state.config.api_key.clone() else {
        error!("completion credential is not configured");
        return HttpResponse::InternalServerError().json(ErrorResponse::new(SERVICE_UNAVAILABLE));
    };

    let messages = prompt::compose_messages(&message, &req.context, &req.history);
    match state.complete(&api_key, &messages).await {
        Ok(text) => {
            let response = if text.trim().is_empty() {
                FALLBACK_RESPONSE.to_string()
            } else {
                text
            };
            HttpResponse::Ok().json(ChatResponse { response })
        }
        Err(err) => {
            error!("upstream completion failed: {}", err);
            match err {
                UpstreamError::AuthRejected => HttpResponse::InternalServerError()
                    .json(ErrorResponse::new(INVALID_API_CONFIGURATION)),
                UpstreamError::RateLimited => {
                    HttpResponse::TooManyRequests().json(ErrorResponse::new(UPSTREAM_OVERLOADED))
                }
                UpstreamError::QuotaExhausted => {
                    HttpResponse::ServiceUnavailable().json(ErrorResponse::new(SERVICE_UNAVAILABLE))
                }
                UpstreamError::Other(_) => {
                    HttpResponse::InternalServerError().json(ErrorResponse::new(INTERNAL_ERROR))
                }
            }
        }
    }
}

#[get("/api/health")]
pub async fn health(_req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// Default handler for unmatched routes. Drains the payload before
/// responding so the client connection stays reusable.
pub async fn sink_handler(_req: HttpRequest, mut payload: web::Payload) -> HttpResponse {
    while let Some(chunk) = payload.next().await {
        if chunk.is_err() {
            break;
        }
    }
    HttpResponse::NotFound().json(ErrorResponse::new(NOT_FOUND))
}

/// Custom error handler for JSON payload errors, so malformed and oversized
/// bodies produce the same JSON error shape as everything else.
pub fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> Error {
    error!("JSON payload error: {:?}", err);
    let response = match &err {
        error::JsonPayloadError::OverflowKnownLength { .. }
        | error::JsonPayloadError::Overflow { .. } => {
            HttpResponse::PayloadTooLarge().json(ErrorResponse::new("Request body too large"))
        }
        _ => HttpResponse::BadRequest().json(ErrorResponse::new("Invalid JSON body")),
    };
    error::InternalError::from_response(err, response).into()
}

fn build_cors(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::permissive();
    }
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allow_any_header()
        .max_age(3600);
    for origin in allowed_origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}

pub async fn startup(config: ProxyConfig) -> std::io::Result<()> {
    logging::init_logging(LoggingConfig {
        level: if config.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        },
        ..Default::default()
    });

    info!("Starting chat proxy on {}:{}", config.host, config.port);
    info!("Upstream provider: {}", config.upstream_url);
    info!("Model: {}", config.model);
    info!(
        "Rate limit: {} requests per {}s window",
        config.rate_limit_max_requests, config.rate_limit_window_secs
    );
    if config.api_key.is_none() {
        error!("OPENAI_API_KEY is not set; /api/v1/chat will fail closed");
    }

    let bind_addr = (config.host.clone(), config.port);
    let limiter = Arc::new(FixedWindowLimiter::new(
        config.rate_limit_max_requests,
        Duration::from_secs(config.rate_limit_window_secs),
    ));
    let max_payload_size = config.max_payload_size;
    let cors_allowed_origins = config.cors_allowed_origins.clone();
    let app_state = web::Data::new(
        AppState::new(config).map_err(|e| std::io::Error::other(e.to_string()))?,
    );

    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(build_cors(&cors_allowed_origins))
            .wrap(RateLimit::new(limiter.clone()))
            .app_data(app_state.clone())
            .app_data(
                web::JsonConfig::default()
                    .limit(max_payload_size)
                    .error_handler(json_error_handler),
            )
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .service(chat)
            .service(health)
            .default_service(web::route().to(sink_handler))
    })
    .bind(bind_addr)?
    .run()
    .await
}
