//! Auth handlers for the Roomdrop service.
//!
//! Implements the account and session endpoints:
//!
//! - `POST /api/v1/auth/signup` - Create an account (public)
//! - `POST /api/v1/auth/login` - Open a session (public)
//! - `POST /api/v1/auth/logout` - Close a session (public, tolerant of missing tokens)
//! - `GET /api/v1/auth/me` - Current user (authenticated)
//!
//! # Security
//!
//! - Request bodies are deserialized manually so malformed JSON returns 400,
//!   not Axum's default 422
//! - Login failures collapse to one generic 401 regardless of whether the
//!   email or the password was wrong
//! - Logout never reveals whether the presented token was live

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::errors::ApiError;
use crate::middleware::{bearer_token, CurrentUser};
use crate::models::{LoginRequest, LoginResponse, MessageResponse, SignupRequest, UserResponse};
use crate::routes::AppState;

// ============================================================================
// Handler: POST /api/v1/auth/signup
// ============================================================================

/// Handler for POST /api/v1/auth/signup
///
/// Create a new account.
///
/// # Response
///
/// - 201 Created: Account created
/// - 400 Bad Request: Malformed body or missing fields
/// - 409 Conflict: Email already registered
#[instrument(
    skip_all,
    name = "rd.auth.signup",
    fields(method = "POST", endpoint = "/api/v1/auth/signup")
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    // Deserialize request body manually to return 400 (not Axum's default 422)
    let request: SignupRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(target: "rd.handlers.auth", error = %e, "Invalid request body");
        ApiError::BadRequest("Invalid request body".to_string())
    })?;

    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let user = state
        .identity
        .create(
            &request.email,
            &request.password,
            request.display_name.as_deref(),
        )
        .await?;

    info!(target: "rd.handlers.auth", user_id = %user.id, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

// ============================================================================
// Handler: POST /api/v1/auth/login
// ============================================================================

/// Handler for POST /api/v1/auth/login
///
/// Authenticate and open a session.
///
/// # Response
///
/// - 200 OK: `{token, user}`
/// - 400 Bad Request: Malformed body or missing fields
/// - 401 Unauthorized: Unknown email or wrong password (indistinguishable)
#[instrument(
    skip_all,
    name = "rd.auth.login",
    fields(method = "POST", endpoint = "/api/v1/auth/login")
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<LoginResponse>, ApiError> {
    // Deserialize request body manually to return 400 (not Axum's default 422)
    let request: LoginRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(target: "rd.handlers.auth", error = %e, "Invalid request body");
        ApiError::BadRequest("Invalid request body".to_string())
    })?;

    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let user = state
        .identity
        .authenticate(&request.email, &request.password)
        .await?;
    let token = state.sessions.open(&user).await?;

    info!(target: "rd.handlers.auth", user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

// ============================================================================
// Handler: POST /api/v1/auth/logout
// ============================================================================

/// Handler for POST /api/v1/auth/logout
///
/// Close the caller's session. Deliberately routed outside the auth
/// middleware: a missing, malformed, or already-closed token still gets a
/// 200 so clients can always converge to the logged-out state.
///
/// # Response
///
/// - 200 OK: Session (if any) closed
#[instrument(
    skip_all,
    name = "rd.auth.logout",
    fields(method = "POST", endpoint = "/api/v1/auth/logout")
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.close(token).await?;
    }

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

// ============================================================================
// Handler: GET /api/v1/auth/me
// ============================================================================

/// Handler for GET /api/v1/auth/me
///
/// Return the authenticated account, as resolved by the auth middleware.
///
/// # Response
///
/// - 200 OK: The current user (no credential material)
/// - 401 Unauthorized: Missing or invalid token (from the middleware)
#[instrument(skip_all, name = "rd.auth.me")]
pub async fn get_me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    tracing::debug!(target: "rd.handlers.auth", user_id = %user.id, "Returning current user");
    Json(UserResponse::from(user))
}
