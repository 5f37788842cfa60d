//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use netabase_core::{AuthService, NewsService, PartyService, PoliticianService, RatingService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub party_service: PartyService,
    pub politician_service: PoliticianService,
    pub rating_service: RatingService,
    pub auth_service: AuthService,
    pub news_service: NewsService,
}

/// Authentication middleware.
///
/// Resolves a bearer access token to its user and stores the user in
/// request extensions; handlers opt in via the `AuthUser` extractor.
/// Requests without (or with invalid) credentials pass through anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        if let Ok(user) = state.auth_service.authenticate_access(token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}
