// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, RegisterRequest, UpdateAccountRequest, User, is_guest_email},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<PgPool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, username, password)
        VALUES ($1, $2, $3)
        RETURNING id, email, username, password, admin, guest_limit_reached_at,
                  created_at, updated_at
        "#,
    )
    .bind(&payload.email)
    .bind(&payload.username)
    .bind(&hashed_password)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        // Postgres error code for unique violation is 23505
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict(format!("Email '{}' already exists", payload.email))
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = User::find_by_email(&pool, &payload.email)
        .await
        .map_err(|e| {
            tracing::error!("Login DB error: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::AuthError("User not found".to_string()))?;

    let is_valid = verify_password(&payload.password, &user.password)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    let token = sign_jwt(user.id, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
    })))
}

/// Updates the current user's account.
///
/// This is also the guest-to-registered conversion path: when a guest's email
/// changes to a non-reserved one, the sticky examination-limit flag is
/// cleared. Nothing else ever clears it.
pub async fn update_account(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<User>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = match &payload.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let converts_to_registered = current_user.is_guest()
        && payload
            .email
            .as_deref()
            .is_some_and(|email| !is_guest_email(email));

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET email = COALESCE($1, email),
            username = COALESCE($2, username),
            password = COALESCE($3, password),
            guest_limit_reached_at = CASE WHEN $4 THEN NULL ELSE guest_limit_reached_at END,
            updated_at = NOW()
        WHERE id = $5
        RETURNING id, email, username, password, admin, guest_limit_reached_at,
                  created_at, updated_at
        "#,
    )
    .bind(&payload.email)
    .bind(&payload.username)
    .bind(&hashed_password)
    .bind(converts_to_registered)
    .bind(current_user.id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict("Email already taken".to_string())
        } else {
            tracing::error!("Failed to update account {}: {:?}", current_user.id, e);
            AppError::from(e)
        }
    })?;

    Ok(Json(user))
}
