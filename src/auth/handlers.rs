use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::auth::{session, users};
use crate::db::models::{Role, User};
use crate::error::{AppError, AppResult};
use crate::extractors::{session_token, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32), custom(function = "validate_username"))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

/// Usernames end up in URLs and comment ids.
fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("username")
            .with_message("only letters, digits and underscores".into()))
    }
}

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name,
        token,
        max_age_hours * 3600
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    req.validate()?;
    let user = users::create_user(
        &state.db,
        &req.username,
        &req.password,
        state.config.auth.bcrypt_cost,
    )?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    let user = users::verify_credentials(&state.db, &req.username, &req.password)?
        .ok_or(AppError::Unauthorized)?;

    let token = session::create_session(&state.db, &user.id, state.config.auth.session_hours)?;
    tracing::info!("User {} logged in", user.username);

    let cookie = session_cookie(
        &state.config.auth.cookie_name,
        &token,
        state.config.auth.session_hours,
    );
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse { token, user }),
    )
        .into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = session_token(&headers, &state.config.auth.cookie_name) {
        session::delete_session(&state.db, token)?;
    }

    Ok((
        StatusCode::NO_CONTENT,
        [(
            header::SET_COOKIE,
            clear_session_cookie(&state.config.auth.cookie_name),
        )],
    )
        .into_response())
}

pub async fn me(State(state): State<AppState>, user: CurrentUser) -> AppResult<Json<User>> {
    users::find_by_username(&state.db, &user.username)?
        .map(Json)
        .ok_or(AppError::Unauthorized)
}

pub async fn set_role(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(username): Path<String>,
    Json(req): Json<RoleRequest>,
) -> AppResult<Json<User>> {
    admin.require_admin()?;
    let user = users::set_role(&state.db, &username, req.role)?;
    Ok(Json(user))
}
