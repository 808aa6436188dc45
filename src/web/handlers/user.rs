//! User handlers.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::Form;
use std::sync::Arc;

use crate::auth::{register, RegistrationRequest};
use crate::db::UserRepository;
use crate::web::dto::{ApiResponse, RegisterForm, UserInfo};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentUser;

/// POST /users - Register a new user.
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), ApiError> {
    let request = RegistrationRequest::new(&form.login, &form.password, &form.name);
    let user = register(state.db.pool(), &request).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(user.into()))))
}

/// GET /users/me - The authenticated user.
pub async fn me(
    State(state): State<Arc<AppState>>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_id(session.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ApiResponse::new(user.into())))
}
