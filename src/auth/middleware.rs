use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, ResponseError,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;

use crate::{auth::jwt::JwtService, types::ApiError};

/// Header carrying the session token
pub const TOKEN_HEADER: &str = "x-token";

/// Verifies the session token and attaches its [`SessionClaims`] to the request
///
/// Requests without a valid token are answered with 401 before reaching the
/// wrapped service.
///
/// [`SessionClaims`]: crate::auth::jwt::SessionClaims
pub struct JwtMiddleware {
    jwt_service: Arc<JwtService>,
}

impl JwtMiddleware {
    pub fn new(jwt_service: Arc<JwtService>) -> Self {
        Self {
            jwt_service,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: S,
    jwt_service: Arc<JwtService>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
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
        let token = match extract_token(&req) {
            Some(token) => token,
            None => return reject(req, ApiError::MissingClaims),
        };

        match self.jwt_service.verify(&token) {
            Ok(claims) => {
                log::debug!("Session verified for user {}", claims.subject_id);
                req.extensions_mut().insert(claims);
            },
            Err(err) => {
                log::info!("Rejected session token on {}: {}", req.path(), err);
                return reject(req, ApiError::Auth(err));
            },
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}

fn reject<B: 'static>(
    req: ServiceRequest,
    error: ApiError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
    let response = req.into_response(error.error_response()).map_into_right_body();
    Box::pin(async move { Ok(response) })
}

/// Token from `x-token`, falling back to `Authorization: Bearer`
fn extract_token(req: &ServiceRequest) -> Option<String> {
    let headers = req.headers();

    if let Some(token) = headers.get(TOKEN_HEADER).and_then(|h| h.to_str().ok()) {
        if !token.trim().is_empty() {
            return Some(token.trim().to_string());
        }
    }

    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
