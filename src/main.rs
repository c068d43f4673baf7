use axum::{http::HeaderValue, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

mod astrology;
mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod services;
mod types;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Astral API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("ASTRAL_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    println!("🚀 Astral API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes (token acquisition)
        .merge(auth_public_routes())
        // Protected API behind JWT middleware
        .merge(protected_routes())
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
}

fn auth_public_routes() -> Router {
    use axum::routing::post;
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
}

fn protected_routes() -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(chart_routes())
        .merge(horoscope_routes())
        .route_layer(axum::middleware::from_fn(
            middleware::auth::jwt_auth_middleware,
        ))
}

fn auth_routes() -> Router {
    use handlers::protected::auth;

    Router::new()
        .route("/api/auth/me", get(auth::me_get))
        .route("/api/auth/subscription", get(auth::subscription_get))
}

fn chart_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::charts;

    Router::new()
        // Collection-level operations
        .route(
            "/api/charts",
            get(charts::collection_get).post(charts::collection_post),
        )
        // Record-level operations
        .route(
            "/api/charts/:id",
            get(charts::record_get).delete(charts::record_delete),
        )
        // Derived computations (premium)
        .route("/api/charts/:id/transits", post(charts::transits_post))
        .route(
            "/api/charts/:id/synastry/:other_id",
            post(charts::synastry_post),
        )
}

fn horoscope_routes() -> Router {
    use handlers::protected::horoscopes;

    Router::new()
        .route("/api/horoscopes/daily", get(horoscopes::daily_get))
        .route("/api/horoscopes/all-signs", get(horoscopes::all_signs_get))
        // Paid tiers
        .route("/api/horoscopes/weekly", get(horoscopes::weekly_get))
        .route("/api/horoscopes/monthly", get(horoscopes::monthly_get))
}

fn cors_layer() -> CorsLayer {
    let security = &config::config().security;

    if !security.enable_cors {
        return CorsLayer::new();
    }

    if matches!(config::config().environment, config::Environment::Development) {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Astral API",
            "version": version,
            "description": "Astrology platform backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/register, /auth/login (public - token acquisition)",
                "auth": "/api/auth/me, /api/auth/subscription (protected)",
                "charts": "/api/charts[/:id] (protected)",
                "transits": "/api/charts/:id/transits (protected, premium)",
                "synastry": "/api/charts/:id/synastry/:other_id (protected, premium)",
                "horoscopes": "/api/horoscopes/{daily,all-signs} (protected)",
                "extended_horoscopes": "/api/horoscopes/{weekly,monthly} (protected, paid)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::Database::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
