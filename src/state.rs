//! Shared, read-only request state

use crate::auth::{CredentialVerifier, JwtService};
use crate::backend::UserBackend;
use crate::clock::{Clock, SystemClock};
use crate::types::Locale;
use std::sync::Arc;

/// Everything a handler needs, built once at startup
///
/// Handlers only read from it; the backend handle is shared, never opened per request.
pub struct AppState {
    pub backend: Arc<dyn UserBackend>,
    pub verifier: CredentialVerifier,
    pub jwt: Arc<JwtService>,
    pub clock: Arc<dyn Clock>,
    pub locale: Locale,
}

impl AppState {
    pub fn new(backend: Arc<dyn UserBackend>, jwt: Arc<JwtService>, locale: Locale) -> Self {
        Self {
            verifier: CredentialVerifier::new(backend.clone()),
            backend,
            jwt,
            clock: Arc::new(SystemClock),
            locale,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
