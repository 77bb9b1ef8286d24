//! Backend user service
//!
//! The gateway never owns user state. Everything it knows about an account comes
//! from the backend peer through the [`UserBackend`] operations below, and every
//! peer failure arrives already classified as an [`RpcFailure`].

pub mod client;

pub use client::HttpUserBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classified failure reported by (or while reaching) the backend peer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcFailure {
    #[error("NotFound: {0}")]
    NotFound(String),

    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),

    #[error("Internal: {0}")]
    Internal(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("{code}: {message}")]
    Other {
        code: String,
        message: String,
    },
}

impl RpcFailure {
    /// Build a failure from a status code name such as `"NotFound"`
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "NotFound" => RpcFailure::NotFound(message),
            "InvalidArgument" => RpcFailure::InvalidArgument(message),
            "Internal" => RpcFailure::Internal(message),
            "Unavailable" => RpcFailure::Unavailable(message),
            other => RpcFailure::Other {
                code: other.to_string(),
                message,
            },
        }
    }

    pub fn code(&self) -> &str {
        match self {
            RpcFailure::NotFound(_) => "NotFound",
            RpcFailure::InvalidArgument(_) => "InvalidArgument",
            RpcFailure::Internal(_) => "Internal",
            RpcFailure::Unavailable(_) => "Unavailable",
            RpcFailure::Other {
                code,
                ..
            } => code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RpcFailure::NotFound(message)
            | RpcFailure::InvalidArgument(message)
            | RpcFailure::Internal(message)
            | RpcFailure::Unavailable(message)
            | RpcFailure::Other {
                message,
                ..
            } => message,
        }
    }
}

/// User record as returned by the backend peer
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendUserRecord {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub mobile: String,
    #[serde(rename = "password", default)]
    pub password_hash: String,
    #[serde(default)]
    pub role: u32,
    /// Unix seconds
    #[serde(default)]
    pub birthday: u64,
    #[serde(default)]
    pub gender: String,
}

// Keep the stored hash out of logs
impl fmt::Debug for BackendUserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendUserRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("mobile", &self.mobile)
            .field("password_hash", &"<hidden>")
            .field("role", &self.role)
            .field("birthday", &self.birthday)
            .field("gender", &self.gender)
            .finish()
    }
}

/// Result of a backend password comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCheck {
    pub success: bool,
}

/// Page selector forwarded to the backend listing call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub pn: u32,
    pub psize: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            pn: 0,
            psize: 10,
        }
    }
}

/// Operations the gateway consumes from the backend user service
#[async_trait]
pub trait UserBackend: Send + Sync {
    /// Looks up a user by mobile number
    async fn get_user_by_mobile(&self, mobile: &str) -> Result<BackendUserRecord, RpcFailure>;

    /// Asks the backend to compare a plaintext password with a stored hash
    async fn check_password(
        &self,
        password: &str,
        encrypted_password: &str,
    ) -> Result<PasswordCheck, RpcFailure>;

    /// Lists users with pagination
    async fn list_users(&self, page: PageRequest) -> Result<Vec<BackendUserRecord>, RpcFailure>;
}
