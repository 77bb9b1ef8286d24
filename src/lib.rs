//! User Gateway
//!
//! Public HTTP front for the backend user service, built with Actix-web.
//! Handles password login with signed session tokens, validation error shaping,
//! translation of backend failures into HTTP responses, and the user list.

pub mod auth;
pub mod backend;
pub mod clock;
pub mod config;
pub mod mocks;
pub mod state;
pub mod types;
pub mod user;
pub mod utils;

// Re-export commonly used types and functions
pub use crate::config::load_config;
pub use state::AppState;
pub use types::{ApiError, AppConfig, StartupError};
pub use user::configure_user_routes;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SERVICE_NAME: &str = "user-gateway";
