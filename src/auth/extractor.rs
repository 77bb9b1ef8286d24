//! Typed access to the verified session of the current request

use crate::auth::jwt::SessionClaims;
use crate::types::ApiError;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use std::ops::Deref;

/// Session claims attached by [`JwtMiddleware`](crate::auth::JwtMiddleware)
///
/// Extraction fails with [`ApiError::MissingClaims`] (401) when the route is not
/// behind the middleware or the claims were never attached.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionClaims);

impl Deref for CurrentUser {
    type Target = SessionClaims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<SessionClaims>().cloned();
        ready(claims.map(CurrentUser).ok_or(ApiError::MissingClaims))
    }
}
