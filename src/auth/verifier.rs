//! Credential verification
//!
//! Login is a two-step exchange with the backend: look the account up by mobile
//! number, then ask the backend to compare the submitted password against the
//! stored hash. The gateway never compares passwords itself.

use crate::auth::{AuthError, BackendStage, CredentialFailure};
use crate::backend::{BackendUserRecord, RpcFailure, UserBackend};
use std::sync::Arc;

pub struct CredentialVerifier {
    backend: Arc<dyn UserBackend>,
}

impl CredentialVerifier {
    pub fn new(backend: Arc<dyn UserBackend>) -> Self {
        Self {
            backend,
        }
    }

    /// Authenticate a login attempt
    ///
    /// Makes at most two backend calls and never retries. The password check
    /// only happens once the lookup has produced a stored hash.
    pub async fn verify(
        &self,
        mobile: &str,
        password: &str,
    ) -> Result<BackendUserRecord, AuthError> {
        let user = match self.backend.get_user_by_mobile(mobile).await {
            Ok(user) => user,
            Err(RpcFailure::NotFound(_)) => {
                return Err(AuthError::InvalidCredentials(CredentialFailure::UnknownMobile));
            },
            Err(failure) => {
                return Err(AuthError::Backend {
                    stage: BackendStage::Lookup,
                    failure,
                });
            },
        };

        let check = self.backend.check_password(password, &user.password_hash).await.map_err(
            |failure| AuthError::Backend {
                stage: BackendStage::PasswordCheck,
                failure,
            },
        )?;

        if !check.success {
            return Err(AuthError::InvalidCredentials(CredentialFailure::PasswordMismatch));
        }

        Ok(user)
    }
}
