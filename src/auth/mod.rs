//! Authentication module
//!
//! This module provides the login side of the gateway:
//! - Credential verification against the backend user service
//! - Session token issuance and verification (JWT)
//! - Middleware and extractor exposing verified session claims to handlers

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod verifier;

// Re-export commonly used types
pub use extractor::CurrentUser;
pub use jwt::{Identity, IssuedToken, JwtService, SessionClaims};
pub use middleware::JwtMiddleware;
pub use verifier::CredentialVerifier;

use crate::backend::RpcFailure;
use std::fmt;
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(CredentialFailure),

    #[error("Backend {stage} failed: {failure}")]
    Backend {
        stage: BackendStage,
        failure: RpcFailure,
    },

    #[error("Token error: {0}")]
    TokenSigning(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,
}

/// Why a login attempt was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFailure {
    /// No account is registered for the mobile number
    UnknownMobile,
    /// The backend rejected the password
    PasswordMismatch,
}

impl fmt::Display for CredentialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialFailure::UnknownMobile => write!(f, "unknown mobile"),
            CredentialFailure::PasswordMismatch => write!(f, "password mismatch"),
        }
    }
}

/// Backend call that was in flight when a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStage {
    Lookup,
    PasswordCheck,
}

impl fmt::Display for BackendStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendStage::Lookup => write!(f, "user lookup"),
            BackendStage::PasswordCheck => write!(f, "password check"),
        }
    }
}
