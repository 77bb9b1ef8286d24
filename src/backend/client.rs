//! JSON-over-HTTP client for the backend user service
//!
//! Each operation is a `POST {base}/user.User/{Method}` carrying a JSON body. A
//! failed call answers with a non-2xx status and, usually, a
//! `{"code": "...", "message": "..."}` body naming the failure kind.

use super::{BackendUserRecord, PageRequest, PasswordCheck, RpcFailure, UserBackend};
use crate::types::{StartupError, UserSrvConfig};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE_PATH: &str = "user.User";

#[derive(Serialize)]
struct MobileRequest<'a> {
    mobile: &'a str,
}

#[derive(Serialize)]
struct PasswordCheckInfo<'a> {
    password: &'a str,
    encrypted_password: &'a str,
}

#[derive(Deserialize)]
struct UserListReply {
    #[serde(default)]
    data: Vec<BackendUserRecord>,
}

#[derive(Deserialize)]
struct StatusBody {
    code: String,
    #[serde(default)]
    message: String,
}

/// Shared backend client
///
/// Holds one pooled `reqwest::Client`; build it once at startup and share it.
#[derive(Debug, Clone)]
pub struct HttpUserBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserBackend {
    pub fn new(config: &UserSrvConfig) -> Result<Self, StartupError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| StartupError::Backend(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    async fn call<Req, Resp>(&self, method: &str, body: &Req) -> Result<Resp, RpcFailure>
    where
        Req: Serialize + Sync + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{}/{}", self.base_url, SERVICE_PATH, method);
        log::debug!("Calling backend {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return response.json::<Resp>().await.map_err(|e| {
                RpcFailure::Internal(format!("Malformed {} reply: {}", method, e))
            });
        }

        let body = response.text().await.unwrap_or_default();
        let failure = classify_status(status, &body);
        log::warn!("Backend {} failed with {}", method, failure.code());
        Err(failure)
    }
}

#[async_trait]
impl UserBackend for HttpUserBackend {
    async fn get_user_by_mobile(&self, mobile: &str) -> Result<BackendUserRecord, RpcFailure> {
        self.call("GetUserByMobile", &MobileRequest {
            mobile,
        })
        .await
    }

    async fn check_password(
        &self,
        password: &str,
        encrypted_password: &str,
    ) -> Result<PasswordCheck, RpcFailure> {
        self.call("CheckPassWord", &PasswordCheckInfo {
            password,
            encrypted_password,
        })
        .await
    }

    async fn list_users(&self, page: PageRequest) -> Result<Vec<BackendUserRecord>, RpcFailure> {
        let reply: UserListReply = self.call("GetUserList", &page).await?;
        Ok(reply.data)
    }
}

/// Classify a failure to get any response at all
fn classify_transport_error(err: reqwest::Error) -> RpcFailure {
    if err.is_timeout() {
        RpcFailure::Other {
            code: "DeadlineExceeded".to_string(),
            message: err.to_string(),
        }
    } else if err.is_connect() || err.is_request() {
        RpcFailure::Unavailable(err.to_string())
    } else {
        RpcFailure::Other {
            code: "Unknown".to_string(),
            message: err.to_string(),
        }
    }
}

/// Classify a non-2xx reply, preferring the status body when it names a code
fn classify_status(status: StatusCode, body: &str) -> RpcFailure {
    let parsed = serde_json::from_str::<StatusBody>(body).ok();
    let message = match parsed {
        Some(parsed) if !parsed.code.trim().is_empty() => {
            return RpcFailure::from_code(parsed.code.trim(), parsed.message);
        },
        Some(parsed) => parsed.message,
        None => body.trim().to_string(),
    };
    match status {
        StatusCode::NOT_FOUND => RpcFailure::NotFound(message),
        StatusCode::BAD_REQUEST => RpcFailure::InvalidArgument(message),
        StatusCode::INTERNAL_SERVER_ERROR => RpcFailure::Internal(message),
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => {
            RpcFailure::Unavailable(message)
        },
        StatusCode::GATEWAY_TIMEOUT => RpcFailure::Other {
            code: "DeadlineExceeded".to_string(),
            message,
        },
        other => RpcFailure::Other {
            code: format!("HTTP {}", other.as_u16()),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_body_wins_over_http_status() {
        let failure = classify_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"code": "NotFound", "message": "user does not exist"}"#,
        );
        assert_eq!(failure, RpcFailure::NotFound("user does not exist".to_string()));
    }

    #[test]
    fn test_http_status_fallback() {
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "gone"),
            RpcFailure::NotFound(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, ""),
            RpcFailure::InvalidArgument(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE, "<html>"),
            RpcFailure::Unavailable(_)
        ));

        let failure = classify_status(StatusCode::FORBIDDEN, "");
        assert_eq!(failure.code(), "HTTP 403");
    }

    #[test]
    fn test_blank_code_falls_back_to_http_status() {
        let failure = classify_status(StatusCode::NOT_FOUND, r#"{"code": ""}"#);
        assert_eq!(failure, RpcFailure::NotFound(String::new()));

        let failure = classify_status(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"code": "  ", "message": "draining"}"#,
        );
        assert_eq!(failure, RpcFailure::Unavailable("draining".to_string()));

        let failure = classify_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"code": ""}"#);
        assert!(matches!(failure, RpcFailure::Internal(_)));
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_unavailable() {
        let backend = HttpUserBackend::new(&UserSrvConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            timeout_ms: 2000,
        })
        .unwrap();

        let result = backend.get_user_by_mobile("13800000000").await;
        assert!(matches!(result, Err(RpcFailure::Unavailable(_))), "got {:?}", result);
    }
}
