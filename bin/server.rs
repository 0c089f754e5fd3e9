// Event Check-in - Web Server
// Payment options and CPF validation over HTTP

use anyhow::{Context, Result};
use event_checkin::api::{router, AppState};
use event_checkin::{logging, PaymentFeeCalculator, Settings};
use tracing::info;

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info");

    let settings = Settings::from_env()?;
    let config = settings.load_payment_config()?;

    info!(
        price = %settings.event_price,
        methods = config.methods.len(),
        "Payment configuration loaded"
    );

    let state = AppState::new(PaymentFeeCalculator::new(config), settings.event_price);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.bind))?;

    info!(addr = %settings.bind, "Server running");
    info!("API: http://{}/api/payment-methods", settings.bind);

    axum::serve(listener, app).await.context("Server stopped unexpectedly")?;

    Ok(())
}
