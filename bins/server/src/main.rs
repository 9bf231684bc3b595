//! Caja Chica API Server
//!
//! Main entry point for the petty-cash backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use caja_api::{AppState, create_router};
use caja_core::storage::{ReceiptStorage, StorageConfig, StorageProvider};
use caja_db::connect;
use caja_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caja=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        access_token_expires_minutes: (config.jwt.access_token_expiry_secs / 60) as i64,
        #[allow(clippy::cast_possible_wrap)]
        refresh_token_expires_days: (config.jwt.refresh_token_expiry_secs / 86400) as i64,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Receipt storage is optional; attachment routes answer 503 without it.
    let storage = match build_storage() {
        Ok(Some(storage)) => {
            info!(provider = storage.provider_name(), "Receipt storage configured");
            Some(Arc::new(storage))
        }
        Ok(None) => {
            warn!("Receipt storage not configured; attachment endpoints disabled");
            None
        }
        Err(e) => {
            warn!(error = %e, "Failed to initialize receipt storage; attachment endpoints disabled");
            None
        }
    };

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        storage,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds receipt storage from `CAJA_STORAGE_*` environment variables.
///
/// Returns `Ok(None)` when no provider is configured.
fn build_storage() -> anyhow::Result<Option<ReceiptStorage>> {
    match std::env::var("CAJA_STORAGE_PROVIDER").ok().as_deref() {
        Some("s3") => {
            let provider = StorageProvider::s3(
                std::env::var("CAJA_STORAGE_ENDPOINT")?,
                std::env::var("CAJA_STORAGE_BUCKET")?,
                std::env::var("CAJA_STORAGE_ACCESS_KEY_ID")?,
                std::env::var("CAJA_STORAGE_SECRET_ACCESS_KEY")?,
                std::env::var("CAJA_STORAGE_REGION").unwrap_or_else(|_| "auto".to_string()),
            );
            Ok(Some(ReceiptStorage::from_config(StorageConfig::new(
                provider,
            ))?))
        }
        Some("local") => {
            let root = std::env::var("CAJA_STORAGE_ROOT")
                .unwrap_or_else(|_| "./storage".to_string());
            Ok(Some(ReceiptStorage::from_config(StorageConfig::new(
                StorageProvider::local_fs(root),
            ))?))
        }
        _ => Ok(None),
    }
}
