use crate::io_struct::ErrorResponse;
use crate::rate_limit::FixedWindowLimiter;
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::sync::Arc;
use tracing::warn;

/// Body returned when a client exceeds the request cap.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please retry in 15 minutes.";

/// Middleware enforcing the fixed-window limiter on `/api/` paths.
///
/// The counter store is injected so tests and the server share one explicit
/// instance instead of a process global.
pub struct RateLimit {
    limiter: Arc<FixedWindowLimiter>,
}

impl RateLimit {
    pub fn new(limiter: Arc<FixedWindowLimiter>) -> Self {
        RateLimit { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitService<S> {
    service: S,
    limiter: Arc<FixedWindowLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.path().starts_with("/api") {
            let key = req
                .peer_addr()
                .map(|addr| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            if !self.limiter.check(&key) {
                warn!("rate limit exceeded for {}", key);
                let (req, _payload) = req.into_parts();
                let res = HttpResponse::TooManyRequests().json(ErrorResponse::new(RATE_LIMIT_MESSAGE));
                return Box::pin(ready(Ok(
                    ServiceResponse::new(req, res).map_into_right_body()
                )));
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
    }
}
