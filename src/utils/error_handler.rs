//! API Error Handler
//!
//! This module provides centralized error handling for the gateway.
//! It converts `ApiError` instances into HTTP responses shaped as a small JSON
//! object keyed by the offending field (or `"msg"`).
//!
//! Backend failures go through [`ApiErrorHandler::translate_rpc_failure`]. Only a
//! `NotFound` message is passed to the client; every other kind is replaced so
//! backend internals never cross the gateway boundary.

use crate::auth::{AuthError, BackendStage, CredentialFailure};
use crate::backend::RpcFailure;
use crate::types::ApiError;
use crate::utils::validation::{FieldErrors, ValidationFailure};
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use std::collections::BTreeMap;

pub const MSG_FIELD: &str = "msg";

pub const USER_NOT_FOUND: &str = "user not found";
pub const LOGIN_FAILED: &str = "login failed";
pub const BAD_REQUEST: &str = "bad request";
pub const INTERNAL_ERROR: &str = "internal error";
pub const SERVICE_UNAVAILABLE: &str = "service unavailable";
pub const TOKEN_GENERATION_FAILED: &str = "failed to generate token";
pub const LOGIN_REQUIRED: &str = "please log in";
pub const TOKEN_INVALID: &str = "invalid token";
pub const TOKEN_EXPIRED: &str = "token expired";

/// Client-facing rendition of a single failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedError {
    pub http_status: u16,
    pub field: String,
    pub message: String,
}

impl TranslatedError {
    pub fn new(status: StatusCode, field: &str, message: impl Into<String>) -> Self {
        Self {
            http_status: status.as_u16(),
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn into_response(self) -> HttpResponse {
        let status = self.status_code();
        let body: BTreeMap<String, String> = BTreeMap::from([(self.field, self.message)]);
        HttpResponse::build(status).json(body)
    }
}

/// Response body for a failed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    Single(TranslatedError),
    Fields(FieldErrors),
}

impl ErrorBody {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorBody::Single(translated) => translated.status_code(),
            ErrorBody::Fields(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Error handler for API responses
pub struct ApiErrorHandler;

impl ApiErrorHandler {
    /// Map a backend failure kind to a status and a safe message
    pub fn translate_rpc_failure(failure: &RpcFailure) -> TranslatedError {
        match failure {
            RpcFailure::NotFound(message) => {
                TranslatedError::new(StatusCode::NOT_FOUND, MSG_FIELD, message.clone())
            },
            RpcFailure::InvalidArgument(_) => {
                TranslatedError::new(StatusCode::BAD_REQUEST, MSG_FIELD, BAD_REQUEST)
            },
            RpcFailure::Internal(_) => {
                TranslatedError::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_FIELD, INTERNAL_ERROR)
            },
            RpcFailure::Unavailable(_) => TranslatedError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                MSG_FIELD,
                SERVICE_UNAVAILABLE,
            ),
            RpcFailure::Other {
                code,
                ..
            } => TranslatedError::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_FIELD, code.clone()),
        }
    }

    /// Convert ApiError to the body the client receives
    pub fn translate(error: &ApiError) -> ErrorBody {
        let translated = match error {
            ApiError::Validation(ValidationFailure::Fields(fields)) => {
                return ErrorBody::Fields(fields.clone());
            },
            ApiError::Validation(ValidationFailure::Malformed(text)) => {
                TranslatedError::new(StatusCode::BAD_REQUEST, MSG_FIELD, text.clone())
            },
            ApiError::Auth(auth) => Self::translate_auth(auth),
            ApiError::Backend(failure) => Self::translate_rpc_failure(failure),
            ApiError::MissingClaims => {
                TranslatedError::new(StatusCode::UNAUTHORIZED, MSG_FIELD, LOGIN_REQUIRED)
            },
        };
        ErrorBody::Single(translated)
    }

    fn translate_auth(error: &AuthError) -> TranslatedError {
        match error {
            AuthError::InvalidCredentials(CredentialFailure::UnknownMobile) => {
                TranslatedError::new(StatusCode::BAD_REQUEST, "mobile", USER_NOT_FOUND)
            },
            AuthError::InvalidCredentials(CredentialFailure::PasswordMismatch) => {
                TranslatedError::new(StatusCode::BAD_REQUEST, MSG_FIELD, LOGIN_FAILED)
            },
            // A down peer keeps its distinct message wherever it happens
            AuthError::Backend {
                stage: BackendStage::PasswordCheck,
                failure,
            } if !matches!(failure, RpcFailure::Unavailable(_)) => {
                TranslatedError::new(StatusCode::INTERNAL_SERVER_ERROR, "password", LOGIN_FAILED)
            },
            AuthError::Backend {
                failure,
                ..
            } => Self::translate_rpc_failure(failure),
            AuthError::TokenSigning(_) => TranslatedError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                MSG_FIELD,
                TOKEN_GENERATION_FAILED,
            ),
            AuthError::InvalidToken(_) => {
                TranslatedError::new(StatusCode::UNAUTHORIZED, MSG_FIELD, TOKEN_INVALID)
            },
            AuthError::TokenExpired => {
                TranslatedError::new(StatusCode::UNAUTHORIZED, MSG_FIELD, TOKEN_EXPIRED)
            },
        }
    }

    /// Create the HTTP response for an ApiError
    pub fn create_response(error: &ApiError) -> HttpResponse {
        match Self::translate(error) {
            ErrorBody::Single(translated) => translated.into_response(),
            ErrorBody::Fields(fields) => HttpResponse::BadRequest().json(fields),
        }
    }
}
