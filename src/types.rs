//! Type definitions for user_gateway
//!
//! Contains the shared error types and configuration models used throughout the app.

use crate::auth::AuthError;
use crate::backend::RpcFailure;
use crate::utils::error_handler::ApiErrorHandler;
use crate::utils::validation::ValidationFailure;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Application startup errors
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Configuration source error: {0}")]
    Settings(#[from] config::ConfigError),
    #[error("Backend client error: {0}")]
    Backend(String),
    #[error("Server binding error: {0}")]
    ServerBind(String),
}

/// Runtime API errors
///
/// Every request path ends in exactly one of these or a success response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(ValidationFailure),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Backend error: {0}")]
    Backend(RpcFailure),

    #[error("Missing session claims")]
    MissingClaims,
}

impl From<ValidationFailure> for ApiError {
    fn from(failure: ValidationFailure) -> Self {
        ApiError::Validation(failure)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        ApiErrorHandler::translate(self).status_code()
    }

    fn error_response(&self) -> HttpResponse {
        ApiErrorHandler::create_response(self)
    }
}

/// Language used for client-facing validation messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Zh => write!(f, "zh"),
        }
    }
}

/// Complete app configuration
///
/// Built once at process startup and shared read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub user_srv: UserSrvConfig,
    pub jwt: JwtConfig,
    pub locale: Locale,
    pub cors_origins: Vec<String>,
    pub log_level: String,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

/// Backend user service location and call budget
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserSrvConfig {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

impl UserSrvConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Session token signing configuration
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub signing_key: String,
    pub issuer: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("signing_key", &"<hidden>")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            user_srv: UserSrvConfig::default(),
            jwt: JwtConfig::default(),
            locale: Locale::default(),
            cors_origins: vec!["*".to_string()],
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8021,
            workers: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
        }
    }
}

impl Default for UserSrvConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
            timeout_ms: 3000,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            signing_key: String::new(),
            issuer: crate::auth::jwt::DEFAULT_ISSUER.to_string(),
        }
    }
}
