use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorTooManyRequests,
    Error,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Per-client rate limiting for a scope, keyed by peer IP.
///
/// `max_requests` may be spent as a burst; capacity then refills evenly over
/// `window`. Over-limit requests get 429.
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
}

impl RateLimit {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(window / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        RateLimit {
            limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    /// Plan generation tier: 5 requests per minute.
    pub fn ai_generation() -> Self {
        Self::new(5, Duration::from_secs(60))
    }

    /// General tier: 100 requests per 15 minutes.
    pub fn general() -> Self {
        Self::new(100, Duration::from_secs(15 * 60))
    }

    pub fn try_acquire(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_string()).is_ok()
    }
}

/// Limiter key for a request: the socket peer's IP. Forwarded headers are
/// client-controlled and ignored.
fn client_key(req: &ServiceRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service,
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitService<S> {
    service: S,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = client_key(&req);

        if !self.limit.try_acquire(&key) {
            log::warn!("Rate limit exceeded for {} on {}", key, req.path());
            return Box::pin(ready(Err(ErrorTooManyRequests(
                "Too many requests, please try again later.",
            ))));
        }

        Box::pin(self.service.call(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_after_burst_per_client() {
        let limit = RateLimit::new(2, Duration::from_secs(60));

        assert!(limit.try_acquire("10.0.0.1"));
        assert!(limit.try_acquire("10.0.0.1"));
        assert!(!limit.try_acquire("10.0.0.1"));
        assert!(limit.try_acquire("10.0.0.2"));
    }

    #[test]
    fn test_key_ignores_forwarded_headers() {
        let req = actix_web::test::TestRequest::default()
            .peer_addr("203.0.113.7:51000".parse().unwrap())
            .insert_header(("X-Forwarded-For", "198.51.100.1"))
            .insert_header(("Forwarded", "for=198.51.100.2"))
            .to_srv_request();
        assert_eq!(client_key(&req), "203.0.113.7");
    }

    #[test]
    fn test_tiers_share_state_across_clones() {
        let limit = RateLimit::ai_generation();
        let worker_copy = limit.clone();

        for _ in 0..5 {
            assert!(limit.try_acquire("10.0.0.9"));
        }
        assert!(!worker_copy.try_acquire("10.0.0.9"));
    }
}
