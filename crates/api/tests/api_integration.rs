//! API integration tests.
//!
//! These tests drive the router end to end over mock database connections.
//! Paths that would cross into Redis (cache fills, invalidation, refresh
//! rotation) need a live instance and stay out of this suite; coverage here
//! is validation, auth, ownership, status codes and the response envelope.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware, Router,
};
use chrono::Utc;
use netabase_api::{middleware::AppState, router as api_router};
use netabase_common::config::AuthConfig;
use netabase_common::{DetailCache, TokenBlacklist};
use netabase_core::{
    AuthService, NewsService, PartyService, PoliticianService, RatingService,
};
use netabase_db::entities::{party, rating, user};
use netabase_db::repositories::{
    InitiativeRepository, PartyRepository, PoliticianRepository, PromiseRepository,
    RatingRepository, UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-test-secret".to_string(),
        access_ttl_secs: 900,
        refresh_ttl_secs: 604_800,
        refresh_cookie: "refresh_token".to_string(),
        cookie_secure: false,
        google_client_id: None,
    }
}

fn redis_client() -> Arc<fred::clients::Client> {
    let config = fred::types::config::Config::default();
    Arc::new(fred::clients::Client::new(config, None, None, None))
}

fn empty_mock_db() -> Arc<DatabaseConnection> {
    Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

/// Build app state over the given mock connections.
fn test_state(
    party_db: Arc<DatabaseConnection>,
    politician_db: Arc<DatabaseConnection>,
    rating_db: Arc<DatabaseConnection>,
    user_db: Arc<DatabaseConnection>,
) -> AppState {
    let redis = redis_client();

    let politician_cache = DetailCache::new(
        Arc::clone(&redis),
        "test:politician".to_string(),
        900,
    );
    let party_cache = DetailCache::new(Arc::clone(&redis), "test:party".to_string(), 600);
    let blacklist = TokenBlacklist::new(redis, "test".to_string());

    let party_service = PartyService::new(PartyRepository::new(Arc::clone(&party_db)), party_cache);
    let politician_service = PoliticianService::new(
        PoliticianRepository::new(Arc::clone(&politician_db)),
        PartyRepository::new(Arc::clone(&party_db)),
        RatingRepository::new(Arc::clone(&rating_db)),
        InitiativeRepository::new(Arc::clone(&politician_db)),
        PromiseRepository::new(Arc::clone(&politician_db)),
        politician_cache.clone(),
    );
    let rating_service = RatingService::new(
        RatingRepository::new(rating_db),
        PoliticianRepository::new(politician_db),
        politician_cache,
    );
    let auth_service = AuthService::new(
        UserRepository::new(user_db),
        blacklist,
        test_auth_config(),
    );
    let news_service = NewsService::new(
        reqwest::Client::new(),
        &netabase_common::config::NewsConfig {
            sources: Vec::new(),
            timeout_secs: 1,
        },
    );

    AppState {
        party_service,
        politician_service,
        rating_service,
        auth_service,
        news_service,
    }
}

fn test_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            netabase_api::middleware::auth_middleware,
        ))
        .with_state(state)
}

fn create_test_user(id: &str, username: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: username.to_string(),
        password_hash: None,
        email: None,
        google_sub: None,
        is_active: true,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn create_test_party(id: &str, name: &str, slug: &str) -> party::Model {
    party::Model {
        id: id.to_string(),
        name: name.to_string(),
        slug: slug.to_string(),
        short_name: None,
        flag: None,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

/// Issue a bearer token the middleware will accept for `user`.
fn bearer_for(user: &user::Model) -> String {
    let auth = AuthService::new(
        UserRepository::new(empty_mock_db()),
        TokenBlacklist::new(redis_client(), "test".to_string()),
        test_auth_config(),
    );
    let pair = auth.issue_pair(user).unwrap();
    format!("Bearer {}", pair.access)
}

#[tokio::test]
async fn test_submit_rating_requires_auth() {
    let state = test_state(
        empty_mock_db(),
        empty_mock_db(),
        empty_mock_db(),
        empty_mock_db(),
    );
    let app = test_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/politicians/jane-doe/ratings")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"score": 5}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_submit_rating_rejects_out_of_range_score() {
    let actor = create_test_user("u1", "alice");

    // Middleware resolves the bearer token against the user table
    let user_db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[actor.clone()]])
            .into_connection(),
    );

    let state = test_state(empty_mock_db(), empty_mock_db(), empty_mock_db(), user_db);
    let app = test_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/politicians/jane-doe/ratings")
                .header(header::AUTHORIZATION, bearer_for(&actor))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"score": 9}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_rating_unknown_politician_is_404() {
    let actor = create_test_user("u1", "alice");

    let user_db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[actor.clone()]])
            .into_connection(),
    );
    let politician_db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<netabase_db::entities::politician::Model>::new()])
            .into_connection(),
    );

    let state = test_state(empty_mock_db(), politician_db, empty_mock_db(), user_db);
    let app = test_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/politicians/nobody/ratings")
                .header(header::AUTHORIZATION, bearer_for(&actor))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"score": 4, "comment": "ok"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_rating_not_found() {
    let rating_db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<rating::Model>::new()])
            .into_connection(),
    );

    let state = test_state(empty_mock_db(), empty_mock_db(), rating_db, empty_mock_db());
    let app = test_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/ratings/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_rating_requires_auth() {
    let state = test_state(
        empty_mock_db(),
        empty_mock_db(),
        empty_mock_db(),
        empty_mock_db(),
    );
    let app = test_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/ratings/r1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"score": 1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_other_users_rating_forbidden() {
    let actor = create_test_user("u2", "mallory");
    let someone_elses = rating::Model {
        id: "r1".to_string(),
        politician_id: "pol1".to_string(),
        user_id: "u1".to_string(),
        score: 3,
        comment: None,
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    };

    let user_db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[actor.clone()]])
            .into_connection(),
    );
    let rating_db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[someone_elses]])
            .into_connection(),
    );

    let state = test_state(empty_mock_db(), empty_mock_db(), rating_db, user_db);
    let app = test_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/ratings/r1")
                .header(header::AUTHORIZATION, bearer_for(&actor))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"score": 1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_party_list_envelope() {
    let p1 = create_test_party("p1", "Civic Union", "civic-union");
    let party_db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[p1]])
            .append_query_results([[maplit_count_row(1)]])
            .into_connection(),
    );

    let state = test_state(party_db, empty_mock_db(), empty_mock_db(), empty_mock_db());
    let app = test_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/parties")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["count"], 1);
    assert!(body["next"].is_null());
    assert!(body["previous"].is_null());
    assert_eq!(body["results"][0]["slug"], "civic-union");
}

fn maplit_count_row(count: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
    let mut row = std::collections::BTreeMap::new();
    row.insert("num_items", sea_orm::Value::from(count));
    row
}

#[tokio::test]
async fn test_politician_list_rejects_unknown_ordering() {
    let state = test_state(
        empty_mock_db(),
        empty_mock_db(),
        empty_mock_db(),
        empty_mock_db(),
    );
    let app = test_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/politicians?ordering=biography")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_requires_auth() {
    let state = test_state(
        empty_mock_db(),
        empty_mock_db(),
        empty_mock_db(),
        empty_mock_db(),
    );
    let app = test_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_profile() {
    let user = create_test_user("u1", "alice");

    let user_db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .into_connection(),
    );

    let state = test_state(empty_mock_db(), empty_mock_db(), empty_mock_db(), user_db);
    let app = test_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::AUTHORIZATION, bearer_for(&user))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn test_refresh_without_cookie_is_401() {
    let state = test_state(
        empty_mock_db(),
        empty_mock_db(),
        empty_mock_db(),
        empty_mock_db(),
    );
    let app = test_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
