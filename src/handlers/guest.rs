// src/handlers/guest.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::{config::Config, error::AppError, models::user::User, utils::jwt::sign_jwt};

/// Creates an ephemeral guest identity and signs it in.
pub async fn guest_sign_in(
    State(pool): State<PgPool>,
    State(config): State<Config>,
) -> Result<impl IntoResponse, AppError> {
    let user = User::create_guest(&pool).await?;
    let token = sign_jwt(user.id, &config.jwt_secret, config.jwt_expiration)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": token,
            "type": "Bearer",
            "user": user,
        })),
    ))
}

/// Signs the current user out. A guest that has reached its examination
/// quota is deleted on the way out; its token stops resolving immediately.
pub async fn sign_out(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let mut guest_deleted = false;

    if current_user.is_guest() && current_user.guest_limit_reached() {
        current_user.destroy(&pool).await?;
        guest_deleted = true;
    }

    Ok(Json(json!({
        "signed_out": true,
        "guest_deleted": guest_deleted,
    })))
}

/// Signs a guest out and deletes the identity unconditionally. Registered
/// users are signed out without deletion.
pub async fn guest_sign_out(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let mut guest_deleted = false;

    if current_user.is_guest() {
        current_user.destroy(&pool).await?;
        guest_deleted = true;
    }

    Ok(Json(json!({
        "signed_out": true,
        "guest_deleted": guest_deleted,
    })))
}
