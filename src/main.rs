use invoice_pipeline_rust::{api, init_tracing, store, AppConfig, PipelineService};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Server startet mit Konfiguration: {:?}", config);

    // 目录在首次使用前创建
    store::ensure_dir(&config.paths.customers_dir)?;
    store::ensure_dir(&config.paths.documents_dir)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(api::AppState::new(PipelineService::new(config)));
    let app = api::router(state);

    info!("Server lauscht auf {}", addr);
    info!("API-Endpunkte:");
    info!("  POST /upload            - CSV/JSON hochladen und Pipeline starten");
    info!("  GET  /pdfs/:filename    - Generierte PDF herunterladen");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
