//! Fire-risk HTTP server binary.
//!
//! Loads the model and preprocessor (failing fast when either is missing),
//! wires the FIRMS and Open-Meteo clients, and serves the API plus the static
//! front-end.
//!
//! # Usage
//!
//! ```bash
//! FIRMS_API_KEY=... cargo run --bin fire-risk-server
//! ```
//!
//! # Environment Variables
//!
//! - `FIRE_RISK_CONFIG`: path to a TOML config file
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8000)
//! - `FIRMS_API_KEY`: NASA FIRMS map key
//! - `MODEL_PATH`, `PREPROCESSOR_PATH`: trained artifacts
//! - `PROVINCES_PATH`, `STATS_DATA_PATH`, `STATIC_DIR`: data files
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use fire_risk::adapters::{FirmsClient, HotspotFetcher, OpenMeteoClient};
use fire_risk::config::AppConfig;
use fire_risk::geo::Geocoder;
use fire_risk::http::{create_router, AppState};
use fire_risk::model::GbdtRiskModel;
use fire_risk::preprocessing::PreprocessorState;
use fire_risk::services::{HotspotService, PredictionService, StatsService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting fire-risk HTTP server");

    let config = AppConfig::load().context("failed to load configuration")?;

    let model = GbdtRiskModel::load(&config.artifacts.model_path).with_context(|| {
        format!("failed to load model from {}", config.artifacts.model_path.display())
    })?;
    let preprocessor = PreprocessorState::load(&config.artifacts.preprocessor_path).with_context(|| {
        format!(
            "failed to load preprocessor from {}",
            config.artifacts.preprocessor_path.display()
        )
    })?;
    info!(
        "Model and preprocessor loaded ({} features)",
        preprocessor.expected_columns.len()
    );

    let geocoder = Arc::new(Geocoder::new(
        &config.data.provinces_path,
        config.data.province_name_property.clone(),
    ));
    let weather = Arc::new(OpenMeteoClient::new(&config.weather).context("failed to build weather client")?);
    let firms = Arc::new(FirmsClient::new(&config.firms).context("failed to build FIRMS client")?);

    let prediction = PredictionService::new(Arc::new(model), Arc::new(preprocessor), geocoder.clone(), weather)
        .context("model and preprocessor disagree on feature order")?;
    let fetcher = HotspotFetcher::new(
        firms,
        config.firms.sources.clone(),
        Duration::from_secs(config.firms.rate_limit_backoff_secs),
    );
    let state = AppState::new(
        prediction,
        HotspotService::new(fetcher, geocoder),
        StatsService::new(&config.data.stats_path),
    )
    .with_static_dir(config.server.static_dir.clone());

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid bind address")?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
