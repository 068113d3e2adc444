//! GitHub sign-in and repository listing.
//!
//! Without OAuth credentials the backend runs in mock mode: every sign-in
//! creates a throwaway session and repository listings come from fixtures.
//! Sessions are identified by the `user_id` cookie.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::api::{ApiError, SharedState};
use super::fixtures::fixture_repositories;
use super::github::TokenResponse;
use super::models::{RepositoryListResponse, RepositorySource, User, UserResponse};

pub const SESSION_COOKIE: &str = "user_id";
const SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 24;

#[derive(Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

#[derive(Deserialize)]
pub struct GitHubTokenRequest {
    #[serde(default)]
    pub code: String,
}

pub fn auth_router() -> axum::Router<SharedState> {
    Router::new()
        .route("/api/auth/github", get(github_redirect))
        .route("/api/auth/github/callback", get(github_callback))
        .route("/api/auth/github-token", post(github_token))
        .route("/api/auth/me", get(current_user))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/repositories", get(list_repositories))
}

// ── Helpers ───────────────────────────────────────────────────────────

/// Read the session id from the request's `Cookie` headers.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}

fn session_cookie(user_id: &str) -> String {
    format!(
        "{}={}; HttpOnly; Max-Age={}; Path=/; SameSite=Lax",
        SESSION_COOKIE, user_id, SESSION_MAX_AGE_SECS
    )
}

fn expired_session_cookie() -> String {
    format!("{}=; Max-Age=0; Path=/; SameSite=Lax", SESSION_COOKIE)
}

fn callback_redirect(state: &SharedState, user: &User) -> Redirect {
    Redirect::temporary(&format!(
        "{}/auth-callback?user_id={}",
        state.frontend_url, user.id
    ))
}

/// `reason` may come straight from GitHub, so it is form-encoded.
fn login_error_redirect(state: &SharedState, reason: &str) -> Redirect {
    let reason: String = url::form_urlencoded::byte_serialize(reason.as_bytes()).collect();
    Redirect::temporary(&format!("{}/login?error={}", state.frontend_url, reason))
}

fn mock_sign_in(state: &SharedState) -> Result<Redirect, ApiError> {
    let user = state.users.create_mock()?;
    info!(user = %user.github_username, "mock sign-in");
    Ok(callback_redirect(state, &user))
}

fn authenticated_user(state: &SharedState, headers: &HeaderMap) -> Result<User, ApiError> {
    let id = session_id(headers).ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?;
    state
        .users
        .get(&id)?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn github_redirect(State(state): State<SharedState>) -> Result<Redirect, ApiError> {
    match &state.oauth {
        None => mock_sign_in(&state),
        Some(oauth) => Ok(Redirect::temporary(
            &state.github.authorize_url(&oauth.client_id),
        )),
    }
}

async fn github_callback(
    State(state): State<SharedState>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, ApiError> {
    let Some(oauth) = state.oauth.clone() else {
        return mock_sign_in(&state);
    };

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        warn!("GitHub callback without code");
        return Ok(login_error_redirect(&state, "missing_parameters"));
    };

    let token = match state
        .github
        .exchange_code(&oauth.client_id, &oauth.client_secret, &code)
        .await
    {
        Ok(TokenResponse {
            error: Some(err), ..
        }) => {
            warn!(error = %err, "GitHub rejected OAuth code");
            return Ok(login_error_redirect(&state, &err));
        }
        Ok(TokenResponse {
            access_token: Some(token),
            ..
        }) => token,
        Ok(_) => {
            error!("GitHub token response had neither token nor error");
            return Ok(login_error_redirect(&state, "authentication_failed"));
        }
        Err(e) => {
            error!(error = %e, "Failed to exchange GitHub code");
            return Ok(login_error_redirect(&state, "authentication_failed"));
        }
    };

    let github_user = match state.github.get_user(&token).await {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "Failed to fetch GitHub user");
            return Ok(login_error_redirect(&state, "authentication_failed"));
        }
    };

    let user = state
        .users
        .create(github_user.login, github_user.avatar_url, token)?;
    info!(user = %user.github_username, "GitHub sign-in");
    Ok(callback_redirect(&state, &user))
}

/// Turn the one-time user id from the callback redirect into a session cookie.
async fn github_token(
    State(state): State<SharedState>,
    Json(req): Json<GitHubTokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.code.is_empty() {
        return Err(ApiError::BadRequest("Code is required".into()));
    }
    let user = state
        .users
        .get(&req.code)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok((
        [(header::SET_COOKIE, session_cookie(&user.id))],
        Json(UserResponse::from(&user)),
    ))
}

async fn current_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let user = authenticated_user(&state, &headers)?;
    Ok(Json(UserResponse::from(&user)))
}

async fn logout(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(id) = session_id(&headers) {
        state.users.remove(&id)?;
    }
    Ok((
        [(header::SET_COOKIE, expired_session_cookie())],
        Json(serde_json::json!({"message": "Logged out successfully"})),
    ))
}

/// List the signed-in user's repositories. Never fails because of GitHub:
/// errors and empty results degrade to the fixture list.
async fn list_repositories(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<RepositoryListResponse>, ApiError> {
    let user = authenticated_user(&state, &headers)?;

    if state.is_mock_github() {
        return Ok(Json(RepositoryListResponse {
            repositories: fixture_repositories(),
            source: RepositorySource::Fixture,
        }));
    }

    let response = match state.repositories.list_repositories(&user.access_token).await {
        Ok(repositories) if !repositories.is_empty() => RepositoryListResponse {
            repositories,
            source: RepositorySource::Github,
        },
        Ok(_) => {
            warn!(user = %user.github_username, "GitHub returned no repositories, serving fixtures");
            RepositoryListResponse {
                repositories: fixture_repositories(),
                source: RepositorySource::Fallback,
            }
        }
        Err(e) => {
            warn!(user = %user.github_username, error = %e, "Failed to list GitHub repositories, serving fixtures");
            RepositoryListResponse {
                repositories: fixture_repositories(),
                source: RepositorySource::Fallback,
            }
        }
    };
    Ok(Json(response))
}
