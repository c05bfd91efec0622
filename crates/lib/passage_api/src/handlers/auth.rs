//! Authentication request handlers.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::{Extension, Json};
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    LoginRequest, LoginResponse, MessageResponse, RefreshRequest, RefreshResponse, UserResponse,
};

/// `GET /auth/google/url`: issue a CSRF state and redirect to the consent screen.
pub async fn google_url_handler(State(state): State<AppState>) -> AppResult<Redirect> {
    let csrf = state.oauth_state.issue();
    let url = state.sessions.provider().authorization_url(&csrf)?;
    Ok(Redirect::temporary(&url))
}

/// `POST /auth/google/login`: complete login from a JSON body.
pub async fn google_login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    complete_login(&state, body).await.map(Json)
}

/// `GET /auth/google/login`: complete login from the provider's redirect.
pub async fn google_callback_handler(
    State(state): State<AppState>,
    Query(params): Query<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    complete_login(&state, params).await.map(Json)
}

async fn complete_login(state: &AppState, req: LoginRequest) -> AppResult<LoginResponse> {
    if !state.oauth_state.take(&req.state) {
        debug!("login rejected: unknown or expired state");
        return Err(AppError::Validation("Invalid state parameter".into()));
    }

    let redirect_uri = req
        .redirect_uri
        .as_deref()
        .unwrap_or(&state.config.google_redirect_uri);

    let outcome = state.sessions.login(&req.code, redirect_uri).await?;
    Ok(outcome.into())
}

/// `POST /auth/refresh`: exchange a refresh token for a new token pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let outcome = state.sessions.refresh(&body.refresh_token).await?;
    Ok(Json(outcome.into()))
}

/// `POST /auth/logout`: drop the caller's stored credential. Requires authentication.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> AppResult<Json<MessageResponse>> {
    state.sessions.logout(&user_id).await?;
    Ok(Json(MessageResponse {
        message: "Logged out successfully".into(),
    }))
}

/// `GET /auth/me`: the caller's user record. Requires authentication.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.sessions.current_user(&user_id).await?;
    Ok(Json(user.into()))
}
