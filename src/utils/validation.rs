//! Form validation errors
//!
//! Validation failures are first collected under dotted struct paths such as
//! `"LoginRequest.mobile"`, then flattened for display by dropping the leading
//! struct name. Messages are localized with the configured [`Locale`].

use crate::types::Locale;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::collections::BTreeMap;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Field path (or bare field name, once flattened) to message
pub type FieldErrors = BTreeMap<String, String>;

static MOBILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^1[3-9][0-9]{9}$")
        .expect("mobile pattern is valid")
});

/// Why a request form was rejected before any backend call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// Per-field rule violations, keyed by bare field name
    #[error("{} invalid field(s)", .0.len())]
    Fields(FieldErrors),

    /// The body could not be decoded into a form at all
    #[error("{0}")]
    Malformed(String),
}

impl ValidationFailure {
    /// Collect, localize and flatten the errors reported for `struct_name`
    pub fn from_errors(struct_name: &str, errors: &ValidationErrors, locale: Locale) -> Self {
        ValidationFailure::Fields(remove_top_struct(field_errors(struct_name, errors, locale)))
    }

    pub fn malformed(err: impl std::fmt::Display) -> Self {
        ValidationFailure::Malformed(err.to_string())
    }
}

/// Drop the first dot-delimited segment of every key
///
/// `"LoginRequest.mobile"` becomes `"mobile"`, `"A.b.c"` becomes `"b.c"`; keys
/// without a dot are kept as they are.
pub fn remove_top_struct(fields: FieldErrors) -> FieldErrors {
    fields
        .into_iter()
        .map(|(field, message)| match field.split_once('.') {
            Some((_, rest)) => (rest.to_string(), message),
            None => (field, message),
        })
        .collect()
}

/// Errors keyed by full dotted path, starting at `struct_name`
pub fn field_errors(struct_name: &str, errors: &ValidationErrors, locale: Locale) -> FieldErrors {
    let mut fields = FieldErrors::new();
    collect(struct_name, errors, locale, &mut fields);
    fields
}

fn collect(prefix: &str, errors: &ValidationErrors, locale: Locale, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let path = format!("{}.{}", prefix, field);
        match kind {
            // Only the first failing rule per field is reported
            ValidationErrorsKind::Field(failures) => {
                if let Some(failure) = failures.first() {
                    out.insert(path, localize(&field.to_string(), failure, locale));
                }
            },
            ValidationErrorsKind::Struct(inner) => collect(&path, inner, locale, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(&format!("{}[{}]", path, index), inner, locale, out);
                }
            },
        }
    }
}

fn localize(field: &str, failure: &ValidationError, locale: Locale) -> String {
    match (locale, failure.code.as_ref()) {
        (Locale::En, "required") => format!("{} is a required field", field),
        (Locale::En, "mobile") => format!("{} is not a valid mobile number", field),
        (Locale::Zh, "required") => format!("{}为必填字段", field),
        (Locale::Zh, "mobile") => format!("{}不是合法的手机号码", field),
        (_, code) => match &failure.message {
            Some(message) => message.to_string(),
            None => match locale {
                Locale::En => format!("{} failed on the '{}' rule", field, code),
                Locale::Zh => format!("{}未通过'{}'校验", field, code),
            },
        },
    }
}

/// `mobile` rule: mainland China mobile number
///
/// Empty input is left to the `required` rule.
pub fn validate_mobile(mobile: &str) -> Result<(), ValidationError> {
    if mobile.is_empty() || MOBILE_RE.is_match(mobile) {
        return Ok(());
    }
    let mut error = ValidationError::new("mobile");
    error.message = Some(Cow::Borrowed("invalid mobile number"));
    Err(error)
}
