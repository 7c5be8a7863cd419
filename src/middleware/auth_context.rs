use std::future::{ready, Ready};

use actix_web::{dev::Payload, error::ErrorUnauthorized, Error, FromRequest, HttpMessage, HttpRequest};

use crate::middleware::auth::Claims;

/// Owner of the request, as verified by [`crate::middleware::auth::AuthMiddleware`].
#[derive(Clone, Debug, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<Claims>().map(|claims| AuthenticatedUser {
            user_id: claims.user_id.clone(),
        });
        ready(user.ok_or_else(|| ErrorUnauthorized("User not authenticated")))
    }
}
