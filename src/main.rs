use freewise::{AppState, Config, app, infrastructure::logging};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    logging::init(&config.log_level);
    info!(?config, "configuration loaded");

    let state = Arc::new(AppState::from_config(&config)?);

    if let Some(admin) = &config.admin {
        if let Err(e) = state.service.ensure_admin(&admin.username, &admin.password).await {
            error!(error = %e, "failed to seed admin user");
        }
    }

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server running at http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
