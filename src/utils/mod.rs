//! Shared helpers for shaping client-facing responses

pub mod error_handler;
pub mod validation;
