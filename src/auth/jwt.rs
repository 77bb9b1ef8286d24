//! JWT token management
//!
//! Handles creation and validation of the signed session tokens handed out on login.
//! The token is the whole session record; the gateway keeps no session store.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::backend::BackendUserRecord;
use crate::types::JwtConfig;

pub const DEFAULT_ISSUER: &str = "user-gateway";

/// Session tokens stay valid this many days after issuance
pub const TOKEN_VALIDITY_DAYS: i64 = 30;

/// Identity an authenticated session is issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: u64,
    pub name: String,
    pub role: u32,
}

impl From<&BackendUserRecord> for Identity {
    fn from(user: &BackendUserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    #[serde(rename = "id")]
    pub subject_id: u64,
    #[serde(rename = "nick_name")]
    pub subject_name: String,
    #[serde(rename = "authority_id")]
    pub role_id: u32,
    #[serde(rename = "iss")]
    pub issuer: String,
    #[serde(rename = "nbf")]
    pub not_before: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl SessionClaims {
    pub fn new(identity: &Identity, issuer: &str, issued_at: DateTime<Utc>) -> Self {
        Self {
            subject_id: identity.id,
            subject_name: identity.name.clone(),
            role_id: identity.role,
            issuer: issuer.to_string(),
            not_before: issued_at.timestamp(),
            expires_at: (issued_at + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp(),
        }
    }
}

/// A signed token and the instant it stops being accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// Custom Debug implementation to hide sensitive keys
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"<hidden>")
            .field("decoding_key", &"<hidden>")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtService {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self::from_keys(
            EncodingKey::from_secret(secret.as_bytes()),
            DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        )
    }

    /// Tokens are always signed with HS256; a key of another family fails at signing
    pub fn from_keys(
        encoding_key: EncodingKey,
        decoding_key: DecodingKey,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            encoding_key,
            decoding_key,
            issuer: issuer.into(),
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(&config.signing_key, config.issuer.clone())
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Sign a session for `identity`, valid from `issued_at` for 30 days
    pub fn issue(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let claims = SessionClaims::new(identity, &self.issuer, issued_at);

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenSigning(format!("Failed to sign session token: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_at: issued_at + Duration::days(TOKEN_VALIDITY_DAYS),
        })
    }

    /// Accepts exactly the claim shape produced by [`JwtService::issue`]
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss"]);
        validation.validate_nbf = true;

        match decode::<SessionClaims>(token, &self.decoding_key, &validation) {
            Ok(token_data) => Ok(token_data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(AuthError::TokenExpired),
                _ => Err(AuthError::InvalidToken(e.to_string())),
            },
        }
    }
}
