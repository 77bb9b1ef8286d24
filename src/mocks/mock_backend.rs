use crate::backend::{BackendUserRecord, PageRequest, PasswordCheck, RpcFailure, UserBackend};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// A backend operation observed by [`MockUserBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    GetUserByMobile(String),
    CheckPassword {
        encrypted_password: String,
    },
    ListUsers(PageRequest),
}

/// Scripted backend peer
///
/// Each operation answers with its configured result; an unconfigured operation
/// answers `Internal`. Every call is recorded, plaintext passwords excepted.
#[derive(Clone)]
pub struct MockUserBackend {
    lookup_result: Arc<Mutex<Option<Result<BackendUserRecord, RpcFailure>>>>,
    password_result: Arc<Mutex<Option<Result<PasswordCheck, RpcFailure>>>>,
    list_result: Arc<Mutex<Option<Result<Vec<BackendUserRecord>, RpcFailure>>>>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn unconfigured(operation: &str) -> RpcFailure {
    RpcFailure::Internal(format!("MockUserBackend::{} called but no result was configured", operation))
}

impl MockUserBackend {
    pub fn new() -> Self {
        MockUserBackend {
            lookup_result: Arc::new(Mutex::new(None)),
            password_result: Arc::new(Mutex::new(None)),
            list_result: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn with_lookup_result(self, result: Result<BackendUserRecord, RpcFailure>) -> Self {
        *locked(&self.lookup_result) = Some(result);
        self
    }

    pub fn with_password_result(self, result: Result<bool, RpcFailure>) -> Self {
        *locked(&self.password_result) = Some(result.map(|success| PasswordCheck {
            success,
        }));
        self
    }

    pub fn with_list_result(self, result: Result<Vec<BackendUserRecord>, RpcFailure>) -> Self {
        *locked(&self.list_result) = Some(result);
        self
    }

    /// Calls seen so far, in order
    pub fn calls(&self) -> Vec<BackendCall> {
        locked(&self.calls).clone()
    }

    /// Record with the given identity and a placeholder hash
    pub fn user(id: u64, name: &str, mobile: &str, role: u32) -> BackendUserRecord {
        BackendUserRecord {
            id,
            name: name.to_string(),
            mobile: mobile.to_string(),
            password_hash: format!("$pbkdf2-sha512$mock${}", id),
            role,
            birthday: 0,
            gender: "male".to_string(),
        }
    }

    fn record(&self, call: BackendCall) {
        locked(&self.calls).push(call);
    }
}

impl Default for MockUserBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserBackend for MockUserBackend {
    async fn get_user_by_mobile(&self, mobile: &str) -> Result<BackendUserRecord, RpcFailure> {
        self.record(BackendCall::GetUserByMobile(mobile.to_string()));
        locked(&self.lookup_result).clone().unwrap_or_else(|| Err(unconfigured("get_user_by_mobile")))
    }

    async fn check_password(
        &self,
        _password: &str,
        encrypted_password: &str,
    ) -> Result<PasswordCheck, RpcFailure> {
        self.record(BackendCall::CheckPassword {
            encrypted_password: encrypted_password.to_string(),
        });
        locked(&self.password_result).clone().unwrap_or_else(|| Err(unconfigured("check_password")))
    }

    async fn list_users(&self, page: PageRequest) -> Result<Vec<BackendUserRecord>, RpcFailure> {
        self.record(BackendCall::ListUsers(page));
        locked(&self.list_result).clone().unwrap_or_else(|| Err(unconfigured("list_users")))
    }
}
