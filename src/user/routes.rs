//! User routes
//!
//! Configuration of the public HTTP endpoints.

use crate::auth::{JwtMiddleware, JwtService};
use crate::types::ApiError;
use crate::user::handlers;
use crate::utils::validation::ValidationFailure;
use actix_web::web;
use std::sync::Arc;

/// Configure user routes
///
/// `POST /login` is open; `GET /users` sits behind the session middleware.
/// Undecodable bodies are answered as validation failures.
pub fn configure_user_routes(jwt: Arc<JwtService>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
            ApiError::from(ValidationFailure::malformed(err)).into()
        }))
        .app_data(web::FormConfig::default().error_handler(|err, _req| {
            ApiError::from(ValidationFailure::malformed(err)).into()
        }))
        .route("/login", web::post().to(handlers::login))
        .service(
            web::resource("/users")
                .wrap(JwtMiddleware::new(jwt))
                .route(web::get().to(handlers::list_users)),
        );
    }
}
