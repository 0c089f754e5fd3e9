// 🌐 HTTP adapter - thin Axum layer over the CPF validator and fee calculator
//
// Handlers only convert requests into plain values and results into
// responses; every decision is made by `cpf` and `payment`.

use crate::cpf::{self, CpfError};
use crate::payment::{PaymentFeeCalculator, PaymentMethod, PaymentOption, PaymentOptions};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    calculator: Arc<PaymentFeeCalculator>,
    event_price: Decimal,
}

impl AppState {
    pub fn new(calculator: PaymentFeeCalculator, event_price: Decimal) -> Self {
        AppState {
            calculator: Arc::new(calculator),
            event_price,
        }
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Client errors; all map to 400
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Cpf(#[from] CpfError),

    #[error("Forma de pagamento inválida: {0}")]
    UnknownMethod(String),

    #[error("Forma de pagamento indisponível para este evento")]
    UnavailableOption,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.to_string()),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

// ============================================================================
// Requests / responses
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CpfRequest {
    #[serde(default)]
    pub cpf: String,
}

#[derive(Debug, Serialize)]
pub struct CpfResponse {
    /// Always true; invalid CPFs come back as 400
    pub valid: bool,

    /// Normalized form, as registrations store it
    pub cpf: String,
    pub formatted: String,
    pub masked: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentSelection {
    pub method: String,
    #[serde(default)]
    pub installments: Option<u32>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/health
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/payment-methods - options for the active event
async fn payment_methods(State(state): State<AppState>) -> Json<PaymentOptions> {
    Json(state.calculator.calculate(state.event_price))
}

/// POST /api/payment-methods/validate - check a checkout selection
async fn validate_selection(
    State(state): State<AppState>,
    Json(selection): Json<PaymentSelection>,
) -> Result<Json<ApiResponse<PaymentOption>>, ApiError> {
    let method: PaymentMethod = selection
        .method
        .parse()
        .map_err(|_| ApiError::UnknownMethod(selection.method.clone()))?;

    let option = state
        .calculator
        .select(state.event_price, method, selection.installments)
        .ok_or(ApiError::UnavailableOption)?;

    info!(%method, installments = option.installment_count(), "Payment selection accepted");
    Ok(Json(ApiResponse::ok(option)))
}

/// POST /api/cpf/validate - check a CPF before registration or lookup
async fn validate_cpf(Json(request): Json<CpfRequest>) -> Result<Json<ApiResponse<CpfResponse>>, ApiError> {
    let cpf = cpf::Cpf::parse(&request.cpf)?;

    Ok(Json(ApiResponse::ok(CpfResponse {
        valid: true,
        formatted: cpf.to_string(),
        masked: cpf.masked(),
        cpf: cpf.as_str().to_string(),
    })))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/payment-methods", get(payment_methods))
        .route("/payment-methods/validate", post(validate_selection))
        .route("/cpf/validate", post(validate_cpf))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
