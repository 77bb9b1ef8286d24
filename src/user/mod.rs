//! User module
//!
//! Public endpoints: password login and the paginated user list.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::configure_user_routes;
