use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod state;

use state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weblog_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Weblog API in {:?} mode", config.environment);

    let pool = match database::pool::connect() {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to configure database pool: {}", e);
            std::process::exit(1);
        }
    };

    // Lazy pool: apply migrations when the store is reachable, keep serving
    // the healthcheck when it is not. Bounded so an unreachable store cannot
    // stall startup behind the pool's acquire timeout.
    let migrations = sqlx::migrate!("./migrations").run(&pool);
    match tokio::time::timeout(std::time::Duration::from_secs(5), migrations).await {
        Ok(Ok(())) => tracing::info!("Database migrations applied"),
        Ok(Err(e)) => tracing::warn!("Migrations not applied: {}", e),
        Err(_) => tracing::warn!("Migrations skipped, store not reachable"),
    }

    let app = app(AppState { pool });

    // Allow tests or deployments to override port via env
    let port = std::env::var("WEBLOG_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Weblog API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(handlers::health::healthcheck))
        .merge(user_routes())
        .merge(post_routes())
        .merge(category_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    use handlers::{auth, users};

    Router::new()
        // Identity and token issuance
        .route("/users/auth/register", post(auth::register))
        .route("/users/auth/jwt/login", post(auth::login))
        // User management
        .route("/users/", get(users::list))
        .route("/users/me", get(users::me))
        .route(
            "/users/:id",
            get(users::get).patch(users::update).delete(users::delete),
        )
}

fn post_routes() -> Router<AppState> {
    use handlers::posts;

    Router::new()
        .route("/posts/", get(posts::list).post(posts::create))
        .route(
            "/posts/:id",
            get(posts::get).patch(posts::update).delete(posts::delete),
        )
}

fn category_routes() -> Router<AppState> {
    use handlers::categories;

    Router::new()
        .route(
            "/categories/",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/:id",
            get(categories::get)
                .patch(categories::update)
                .delete(categories::delete),
        )
}
