//! OpenSASE Merchandising - collection rules and catalog hierarchy service

use anyhow::Result;
use opensase_merchandising::api::{self, AppState, SERVICE_NAME};
use opensase_merchandising::config::ServiceConfig;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = ServiceConfig::from_env()?;
    let port = config.port;
    tracing::info!(reference_attributes = ?config.reference_attributes, max_rules = config.max_rules, max_records = config.max_records, "configuration loaded");

    let app = api::router(AppState::new(config))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()));

    tracing::info!("🚀 {} listening on 0.0.0.0:{}", SERVICE_NAME, port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}
