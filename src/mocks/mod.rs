//! In-memory stand-ins for external collaborators, used by tests

pub mod mock_backend;

pub use mock_backend::{BackendCall, MockUserBackend};
