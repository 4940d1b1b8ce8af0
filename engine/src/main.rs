// Engine main entry point
use std::sync::Arc;

use engine::config::settings::EngineSettings;
use engine::forecast::load_predictor;
use engine::forecast::sidecar::SidecarModelProvider;
use engine::forecast::Predictor;
use engine::services::prediction_service::PredictionService;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Kronos Prediction Service...");

    let settings = EngineSettings::from_env();
    let addr = settings.bind_addr()?;

    let predictor = init_model(&settings).await;
    if predictor.is_none() {
        warn!("Running without Kronos model (fallback mode)");
    }

    let service = Arc::new(PredictionService::new(predictor, settings.max_pred_hours));
    let app = engine::services::router(service);

    info!("Service listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Loads the model once; the handle is read-only for the rest of the process.
async fn init_model(settings: &EngineSettings) -> Option<Arc<dyn Predictor>> {
    if !settings.kronos_enabled {
        info!("Kronos disabled by configuration, skipping model initialization");
        return None;
    }

    let provider = SidecarModelProvider::new(settings.model_sock.clone());
    match load_predictor(&provider, settings).await {
        Ok(predictor) => {
            info!(model = %settings.model, "Kronos model initialized successfully");
            Some(predictor)
        }
        Err(e) => {
            warn!(error = %e, "Failed to initialize Kronos model");
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, gracefully stopping...");
}
