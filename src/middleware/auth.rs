use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // email
    pub exp: usize,
    pub iat: usize,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Value>,
}

/// Rejects requests without a valid HS256 bearer token and stores the
/// decoded [`Claims`] in the request extensions.
pub struct AuthMiddleware {
    secret: Arc<String>,
}

impl AuthMiddleware {
    pub fn new(secret: impl Into<String>) -> Self {
        AuthMiddleware {
            secret: Arc::new(secret.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            secret: self.secret.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    secret: Arc<String>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);

        let Some(token) = token else {
            return Box::pin(ready(Err(ErrorUnauthorized("No authorization header"))));
        };

        match decode_claims(&token, &self.secret) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                Box::pin(self.service.call(req))
            }
            Err(err) => {
                log::debug!("Rejected bearer token for {}: {}", req.path(), err);
                Box::pin(ready(Err(ErrorUnauthorized("Invalid token"))))
            }
        }
    }
}

pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "iat", "sub", "user_id"]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation).map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "traveler@example.com".to_string(),
            exp: (now + exp_offset) as usize,
            iat: now as usize,
            user_id: "user-1".to_string(),
            preferences: None,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_decodes_valid_token() {
        let claims = decode_claims(&token("s3cret", 3600), "s3cret").unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert!(claims.preferences.is_none());
    }

    #[test]
    fn test_rejects_wrong_secret_and_expired_token() {
        assert!(decode_claims(&token("s3cret", 3600), "other").is_err());
        assert!(decode_claims(&token("s3cret", -3600), "s3cret").is_err());
    }
}
