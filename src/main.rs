// Onboarding Forms Server - schema builder and form evaluation API

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use onboarding_forms::{api::create_router, app_state::AppState, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(config.clone())?;
    {
        let store = app_state.store.lock().await;
        info!(fields = store.effective_schema().len(), "Loaded form schema");
    }

    // Build main application router
    let app = create_router(app_state).layer(CorsLayer::permissive());

    // Start server
    let addr = config.server_address();
    info!("Onboarding forms server starting on http://{}", addr);
    info!("  GET    /api/schema                     - Effective form schema");
    info!("  GET    /api/schema/fields              - Visible fields");
    info!("  POST   /api/schema/fields              - Add custom field");
    info!("  PUT    /api/schema/fields/{{name}}       - Edit custom field");
    info!("  DELETE /api/schema/fields/{{name}}       - Delete custom field");
    info!("  POST   /api/schema/reset               - Restore default fields");
    info!("  POST   /api/forms/validate             - Validate form values");
    info!("  POST   /api/forms/render               - Render form controls");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
