//! Authentication endpoints.
//!
//! Access tokens travel in the response body and the `Authorization`
//! header; refresh tokens only ever travel in an HTTP-only cookie, and
//! every refresh rotates the cookie.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use netabase_common::{AppError, AppResult};
use netabase_core::{LoginInput, RegisterInput, TokenPair};
use netabase_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::extractors::AuthUser;
use crate::middleware::AppState;

/// Access token bundle returned by login-shaped endpoints.
#[derive(Serialize)]
pub struct TokenBundle {
    pub access: String,
    pub user_id: String,
}

/// Registration response.
#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub tokens: TokenBundle,
}

/// Login response.
#[derive(Serialize)]
pub struct LoginResponse {
    pub tokens: TokenBundle,
}

/// Google sign-in request.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    /// The Google-issued ID token.
    pub credential: String,
}

/// Profile response.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

fn refresh_cookie(state: &AppState, tokens: &TokenPair) -> Cookie<'static> {
    Cookie::build((
        state.auth_service.refresh_cookie_name().to_string(),
        tokens.refresh.clone(),
    ))
    .path("/")
    .http_only(true)
    .secure(state.auth_service.cookie_secure())
    .same_site(SameSite::Lax)
    .max_age(time::Duration::seconds(tokens.refresh_max_age_secs))
    .build()
}

fn clear_refresh_cookie(state: &AppState) -> Cookie<'static> {
    Cookie::build((state.auth_service.refresh_cookie_name().to_string(), ""))
        .path("/")
        .http_only(true)
        .build()
}

/// Create a new account.
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<RegisterInput>,
) -> AppResult<(StatusCode, CookieJar, Json<RegisterResponse>)> {
    let (user, tokens) = state.auth_service.register(input).await?;
    let jar = jar.add(refresh_cookie(&state, &tokens));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(RegisterResponse {
            message: "User created successfully".to_string(),
            tokens: TokenBundle {
                access: tokens.access,
                user_id: user.id,
            },
        }),
    ))
}

/// Log in with username and password.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let (user, tokens) = state.auth_service.login(&input).await?;
    let jar = jar.add(refresh_cookie(&state, &tokens));

    Ok((
        jar,
        Json(LoginResponse {
            tokens: TokenBundle {
                access: tokens.access,
                user_id: user.id,
            },
        }),
    ))
}

/// Log in with a Google ID token, creating the account on first use.
async fn google(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<GoogleLoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let (user, tokens) = state.auth_service.google_login(&request.credential).await?;
    let jar = jar.add(refresh_cookie(&state, &tokens));

    Ok((
        jar,
        Json(LoginResponse {
            tokens: TokenBundle {
                access: tokens.access,
                user_id: user.id,
            },
        }),
    ))
}

/// Rotate the refresh token from the HTTP-only cookie and issue a new
/// access token.
async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let token = jar
        .get(state.auth_service.refresh_cookie_name())
        .map(|cookie| cookie.value().to_string())
        .ok_or(AppError::Unauthorized)?;

    let (user, tokens) = state.auth_service.refresh(&token).await?;
    let jar = jar.add(refresh_cookie(&state, &tokens));

    Ok((
        jar,
        Json(LoginResponse {
            tokens: TokenBundle {
                access: tokens.access,
                user_id: user.id,
            },
        }),
    ))
}

/// Logout response.
#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Blacklist the refresh token and clear its cookie.
async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<LogoutResponse>)> {
    if let Some(cookie) = jar.get(state.auth_service.refresh_cookie_name()) {
        match state.auth_service.logout(cookie.value()).await {
            // An invalid or expired token has nothing left to revoke
            Ok(()) | Err(AppError::Unauthorized) => {}
            Err(e) => return Err(e),
        }
    }

    let jar = jar.remove(clear_refresh_cookie(&state));

    Ok((
        jar,
        Json(LogoutResponse {
            message: "Logged out".to_string(),
        }),
    ))
}

/// Get the authenticated user's profile.
async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/google", post(google))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
}
