//! Library catalog server
//!
//! REST API for the office library.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_catalog::{
    api,
    config::AppConfig,
    directory::{Directory, LdapDirectory, StaticDirectory},
    repository::Repository,
    services::{email::EmailService, redis::RedisService, reservations::ReservationsService, Services},
    AppState,
};

/// How often lapsed reservations are put back on the shelf
const RELEASE_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("library_catalog={},tower_http=debug", config.logging.level).into());

    let (file_layer, _file_guard) = match &config.logging.file {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "library-catalog.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };
    let json = config.logging.format == "json";

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .with(file_layer)
        .init();

    tracing::info!("Starting library catalog v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let redis_service = RedisService::new(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;

    tracing::info!("Connected to Redis");

    let directory: Arc<dyn Directory> = match config.directory.backend.as_str() {
        "static" => {
            tracing::warn!("Using the static directory, only local accounts can sign in");
            Arc::new(StaticDirectory::default())
        }
        _ => Arc::new(LdapDirectory::new(config.directory.clone())),
    };
    let mailer = Arc::new(EmailService::new(config.email.clone()));

    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    let repository = Repository::new(pool.clone());
    let services = Services::new(repository, &config, directory, redis_service, mailer);

    spawn_reservation_sweeper(services.reservations.clone());

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        pool,
    };

    let app = create_router(state);

    let addr = SocketAddr::new(
        server_host
            .parse()
            .with_context(|| format!("Invalid host address {}", server_host))?,
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically release reservations whose pickup window has passed
fn spawn_reservation_sweeper(reservations: ReservationsService) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RELEASE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = reservations.release_expired().await {
                tracing::warn!("Releasing expired reservations failed: {}", e);
            }
        }
    });
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Pages
        .route("/", get(api::pages::index))
        .route("/login", get(api::pages::login_page))
        .route("/search", get(api::pages::search_page))
        .route("/contact", get(api::pages::contact_page).post(api::pages::contact_submit))
        .route("/register", get(api::pages::register_page).post(api::pages::register_submit))
        .route("/forms/:name", get(api::pages::form_schema))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/forgot-password", post(api::auth::forgot_password))
        .route("/auth/reset-password", post(api::auth::reset_password))
        // Profile
        .route("/profile", put(api::users::update_my_profile))
        .route("/profile/password", put(api::users::change_my_password))
        // Items (catalog)
        .route("/items", get(api::items::list_items))
        .route("/items/books", post(api::items::create_book))
        .route("/items/books/:id", put(api::items::update_book))
        .route("/items/magazines", post(api::items::create_magazine))
        .route("/items/magazines/:id", put(api::items::update_magazine))
        .route("/items/:id", get(api::items::get_item))
        .route("/items/:id", delete(api::items::delete_item))
        .route("/items/:id/copies", get(api::items::list_copies))
        .route("/items/:id/copies", post(api::items::add_copy))
        .route("/items/:id/reserve", post(api::reservations::reserve))
        // Copies
        .route("/copies/:id", put(api::items::edit_copy))
        .route("/copies/:id", delete(api::items::delete_copy))
        // Reservations
        .route("/reservations", get(api::reservations::list_my_reservations))
        .route("/reservations/:id/cancel", post(api::reservations::cancel))
        .route("/reservations/:id/borrow", post(api::reservations::mark_borrowed))
        .route("/reservations/:id/return", post(api::reservations::mark_returned))
        // Wishlist
        .route("/wishlist", get(api::wishlist::list_wishlist))
        .route("/wishlist", post(api::wishlist::add_wish))
        .route("/wishlist/:id", delete(api::wishlist::delete_wish))
        .route("/wishlist/:id/like", post(api::wishlist::like_wish))
        // Administration
        .route("/admin/promote", post(api::admin::promote_admins))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
