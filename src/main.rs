use axum::{
    Extension, Router,
    middleware::from_fn,
    routing::{get, post},
};
use bikerent::{
    config::Config,
    db,
    handlers::{
        bikes::{create_bike, get_all_bikes, get_bike, get_pricing_types, quote_bike},
        bookings::{
            cancel_booking, complete_booking, create_booking, get_all_bookings, get_booking,
        },
        health::health_check,
    },
    middleware::session_middleware,
    state::{AppState, DbProvider, DemoDbProvider, SingleDbProvider},
};
use std::{sync::Arc, time::Duration};
use surrealdb::{
    Surreal,
    engine::local::{Db, RocksDb},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

async fn persistent_provider(database_path: &str) -> DbProvider {
    info!("Initializing SurrealDB at {}", database_path);

    // Create the data directory if it doesn't exist
    std::fs::create_dir_all(database_path).expect("Failed to create data directory");

    let db: Surreal<Db> = Surreal::new::<RocksDb>(database_path.to_string())
        .await
        .expect("Failed to initialize SurrealDB");

    db.use_ns("bikerent")
        .use_db("main")
        .await
        .expect("Failed to use namespace and database");

    info!("Setting up database schema...");
    db::setup_database(&db)
        .await
        .expect("Failed to set up database schema");

    info!("Note: For database management, use SurrealDB CLI:");
    info!(
        "  surreal sql --endpoint rocksdb://{} --namespace bikerent --database main",
        database_path
    );

    DbProvider::Single(SingleDbProvider { db })
}

fn demo_provider() -> DbProvider {
    info!("Demo mode: every session gets its own seeded in-memory database");
    let provider = DemoDbProvider::new();

    let sessions = provider.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            sessions.cleanup_old_sessions();
        }
    });

    DbProvider::Demo(provider)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let db_provider = if config.demo_mode {
        demo_provider()
    } else {
        persistent_provider(&config.database_path).await
    };

    let state = Arc::new(AppState {
        db_provider: Arc::new(db_provider),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/bikes", get(get_all_bikes).post(create_bike))
        .route("/api/bikes/{id}", get(get_bike))
        .route("/api/bikes/{id}/pricing-types", get(get_pricing_types))
        .route("/api/bikes/{id}/quote", post(quote_bike))
        .route("/api/bookings", get(get_all_bookings).post(create_booking))
        .route("/api/bookings/{id}", get(get_booking))
        .route("/api/bookings/{id}/complete", post(complete_booking))
        .route("/api/bookings/{id}/cancel", post(cancel_booking))
        // Serve the booking UI as fallback
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(from_fn(session_middleware))
        .layer(Extension(state))
        .layer(CompressionLayer::new())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listener");

    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await.expect("Server error");
}
