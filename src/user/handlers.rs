//! User API handlers
//!
//! HTTP handler functions for the public user endpoints. They decode and validate
//! the request, call into the auth layer or the backend, and shape the response.
//! Every failure is returned as an [`ApiError`], which renders itself.

use actix_web::{web, Either, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{jwt::Identity, CurrentUser},
    state::AppState,
    types::ApiError,
    user::dto::{ListUsersQuery, LoginRequest, LoginResponse, UserResponse},
    utils::validation::ValidationFailure,
};

/// Handle password login
///
/// Validates the form, verifies the credentials against the backend and, on
/// success, issues a session token valid for 30 days.
pub async fn login(
    state: web::Data<AppState>,
    form: Either<web::Json<LoginRequest>, web::Form<LoginRequest>>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let form = match form {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    form.validate().map_err(|errors| {
        ValidationFailure::from_errors("LoginRequest", &errors, state.locale)
    })?;

    let user = state.verifier.verify(&form.mobile, &form.password).await.map_err(|err| {
        log::warn!("[{}] login refused: {}", request_id, err);
        err
    })?;

    let issued = state.jwt.issue(&Identity::from(&user), state.clock.now()).map_err(|err| {
        log::error!("[{}] {}", request_id, err);
        err
    })?;

    log::info!("[{}] user {} logged in", request_id, user.id);

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: user.id,
        nick_name: user.name,
        token: issued.token,
        expired_at: issued.expires_at.timestamp() * 1000,
    }))
}

/// List users
///
/// Requires a verified session. Pagination is forwarded to the backend as is.
pub async fn list_users(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    query: web::Query<ListUsersQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page_request();
    log::info!("user {} listing users, page {} size {}", current_user.subject_id, page.pn, page.psize);

    let users = state.backend.list_users(page).await.map_err(|failure| {
        log::error!("listing users failed: {}", failure);
        ApiError::Backend(failure)
    })?;

    let response: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}
