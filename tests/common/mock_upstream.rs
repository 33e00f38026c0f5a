//! In-process mock of the completion provider

use actix_web::{App, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use std::net::TcpListener;
use std::sync::Mutex;

/// Canned upstream behavior for one mock server instance.
#[derive(Clone)]
pub enum UpstreamMode {
    /// 200 with the given completion text.
    Success(String),
    /// 200 with a null completion content.
    Empty,
    /// 401 with the provider's invalid-key error body.
    AuthError,
    /// 429 with a plain rate-limit error body.
    RateLimited,
    /// 429 with the `insufficient_quota` error code.
    QuotaExhausted,
}

pub struct MockUpstream {
    pub base_url: String,
    requests: web::Data<Mutex<Vec<Value>>>,
}

impl MockUpstream {
    /// Bodies received on `/v1/chat/completions`, in arrival order.
    pub fn received(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

fn completion_body(content: Value) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn error_body(code: &str, message: &str) -> Value {
    json!({
        "error": { "message": message, "type": "invalid_request_error", "code": code }
    })
}

async fn chat_completions(
    body: web::Json<Value>,
    mode: web::Data<UpstreamMode>,
    requests: web::Data<Mutex<Vec<Value>>>,
) -> HttpResponse {
    requests.lock().unwrap().push(body.into_inner());
    match mode.get_ref() {
        UpstreamMode::Success(text) => HttpResponse::Ok().json(completion_body(json!(text))),
        UpstreamMode::Empty => HttpResponse::Ok().json(completion_body(Value::Null)),
        UpstreamMode::AuthError => HttpResponse::Unauthorized()
            .json(error_body("invalid_api_key", "Incorrect API key provided")),
        UpstreamMode::RateLimited => HttpResponse::TooManyRequests()
            .json(error_body("rate_limit_exceeded", "Rate limit reached for requests")),
        UpstreamMode::QuotaExhausted => HttpResponse::TooManyRequests()
            .json(error_body("insufficient_quota", "You exceeded your current quota")),
    }
}

/// Start a mock provider on an ephemeral port and return its base URL plus
/// the log of received request bodies.
pub async fn start_mock_upstream(mode: UpstreamMode) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let requests = web::Data::new(Mutex::new(Vec::<Value>::new()));
    let app_requests = requests.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(mode.clone()))
            .app_data(app_requests.clone())
            .route("/v1/chat/completions", web::post().to(chat_completions))
    })
    .listen(listener)
    .unwrap()
    .workers(1)
    .run();
    actix_web::rt::spawn(server);

    // Give the server a moment to start
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    MockUpstream {
        base_url: format!("http://{}", addr),
        requests,
    }
}
