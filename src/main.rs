use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_backend::api::router;
use campus_backend::config::{AppConfig, StorageBackend};
use campus_backend::state::AppState;
use campus_backend::storage::{MemStorage, SqliteStorage, Storage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "campus_backend=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    let storage: Arc<dyn Storage> = match config.backend {
        StorageBackend::Memory => {
            info!("using in-memory storage");
            Arc::new(MemStorage::new())
        }
        StorageBackend::Sqlite => {
            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect(&config.database_url)
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            Arc::new(SqliteStorage::new(pool))
        }
    };

    let state = AppState {
        storage,
        upload_delay: config.upload_delay,
    };
    let app = router(state);

    info!("listening on http://{}", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
