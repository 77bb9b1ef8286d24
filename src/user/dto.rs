//! User Data Transfer Objects
//!
//! Request and response payloads of the public user endpoints.

use crate::backend::{BackendUserRecord, PageRequest};
use crate::utils::validation::validate_mobile;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login form, accepted as JSON or urlencoded
///
/// Missing fields decode as empty strings so they surface as `required` errors.
#[derive(Deserialize, Serialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, code = "required"), custom(function = "validate_mobile"))]
    pub mobile: String,

    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub password: String,
}

/// Successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: u64,
    pub nick_name: String,
    pub token: String,
    /// Milliseconds since the epoch
    pub expired_at: i64,
}

/// List users query parameters
///
/// Kept as raw strings: unparsable numbers fall back to zero instead of failing.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub pn: Option<String>,
    pub psize: Option<String>,
}

impl ListUsersQuery {
    pub fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            pn: parse_or_zero(self.pn.as_deref(), defaults.pn),
            psize: parse_or_zero(self.psize.as_deref(), defaults.psize),
        }
    }
}

fn parse_or_zero(value: Option<&str>, default: u32) -> u32 {
    match value {
        Some(raw) => raw.trim().parse().unwrap_or(0),
        None => default,
    }
}

/// User summary for lists
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: u64,
    pub name: String,
    /// `YYYY-MM-DD`
    pub birthday: String,
    pub gender: String,
    pub mobile: String,
}

impl From<&BackendUserRecord> for UserResponse {
    fn from(user: &BackendUserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            birthday: format_birthday(user.birthday),
            gender: user.gender.clone(),
            mobile: user.mobile.clone(),
        }
    }
}

/// Format unix seconds as a UTC calendar date
pub fn format_birthday(seconds: u64) -> String {
    i64::try_from(seconds)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page = ListUsersQuery::default().page_request();
        assert_eq!(page, PageRequest {
            pn: 0,
            psize: 10,
        });
    }

    #[test]
    fn test_non_numeric_page_is_zero() {
        let query = ListUsersQuery {
            pn: Some("two".to_string()),
            psize: Some("25".to_string()),
        };
        assert_eq!(query.page_request(), PageRequest {
            pn: 0,
            psize: 25,
        });

        let query = ListUsersQuery {
            pn: Some("3".to_string()),
            psize: Some("-1".to_string()),
        };
        assert_eq!(query.page_request(), PageRequest {
            pn: 3,
            psize: 0,
        });
    }

    #[test]
    fn test_birthday_format() {
        assert_eq!(format_birthday(0), "1970-01-01");
        assert_eq!(format_birthday(946_684_800), "2000-01-01");
    }

    #[test]
    fn test_login_request_rules() {
        let ok = LoginRequest {
            mobile: "13800000000".to_string(),
            password: "secret".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginRequest {
            mobile: "123".to_string(),
            password: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["mobile"][0].code, "mobile");
        assert_eq!(fields["password"][0].code, "required");
    }
}
