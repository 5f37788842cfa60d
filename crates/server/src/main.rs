//! Netabase server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use fred::interfaces::ClientLike;
use netabase_api::{middleware::AppState, router as api_router};
use netabase_common::{Config, DetailCache, TokenBlacklist};
use netabase_core::{AuthService, NewsService, PartyService, PoliticianService, RatingService};
use netabase_db::repositories::{
    InitiativeRepository, PartyRepository, PoliticianRepository, PromiseRepository,
    RatingRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Liveness probe.
async fn ping() -> &'static str {
    "pong"
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "netabase=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting netabase server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = netabase_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    netabase_db::migrate(&db).await?;
    info!("Migrations completed");

    // Connect to Redis (detail caches, refresh token blacklist)
    info!("Connecting to Redis...");
    let fred_config = fred::types::config::Config::from_url(&config.redis.url)
        .expect("Failed to parse Redis URL");
    let redis_client = fred::clients::Client::new(fred_config, None, None, None);
    redis_client.connect();
    redis_client
        .wait_for_connect()
        .await
        .expect("Failed to connect to Redis");
    let redis_client = Arc::new(redis_client);
    info!("Connected to Redis");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let party_repo = PartyRepository::new(Arc::clone(&db));
    let politician_repo = PoliticianRepository::new(Arc::clone(&db));
    let rating_repo = RatingRepository::new(Arc::clone(&db));
    let initiative_repo = InitiativeRepository::new(Arc::clone(&db));
    let promise_repo = PromiseRepository::new(Arc::clone(&db));

    // Initialize caches; rating writes invalidate the politician cache
    let politician_cache = DetailCache::new(
        Arc::clone(&redis_client),
        format!("{}:politician", config.redis.prefix),
        config.cache.politician_detail_ttl_secs,
    );
    let party_cache = DetailCache::new(
        Arc::clone(&redis_client),
        format!("{}:party", config.redis.prefix),
        config.cache.party_detail_ttl_secs,
    );
    let blacklist = TokenBlacklist::new(Arc::clone(&redis_client), config.redis.prefix.clone());

    // Initialize services
    let party_service = PartyService::new(party_repo.clone(), party_cache);
    let politician_service = PoliticianService::new(
        politician_repo.clone(),
        party_repo,
        rating_repo.clone(),
        initiative_repo,
        promise_repo,
        politician_cache.clone(),
    );
    let rating_service = RatingService::new(rating_repo, politician_repo, politician_cache);
    let auth_service = AuthService::new(user_repo, blacklist, config.auth.clone());
    let news_service = NewsService::new(reqwest::Client::new(), &config.news);

    // Create app state
    let state = AppState {
        party_service,
        politician_service,
        rating_service,
        auth_service,
        news_service,
    };

    // Build router
    let app = Router::new()
        .route("/ping", get(ping))
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            netabase_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
