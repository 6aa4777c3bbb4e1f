//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{error, info};

use crate::{state::AppState, utils::format_playtime};

use super::responses::{ApiResponse, CreditRequest, HealthResponse, StatusResponse};

/// Handle POST /quarter - Spend one quarter for playtime
///
/// An empty quarter balance is a rejection payload, not an HTTP error; the
/// caller is expected to check the status field.
pub async fn quarter_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.insert_quarter() {
        Ok((true, timer)) => {
            info!("Quarter endpoint called - quarter accepted");
            Ok(Json(ApiResponse::accepted(
                "Quarter accepted, playtime added".to_string(),
                timer,
            )))
        }
        Ok((false, timer)) => Ok(Json(ApiResponse::rejected(
            "no quarters available".to_string(),
            timer,
        ))),
        Err(e) => {
            error!("Failed to insert quarter: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /quarters/credit - Purchase collaborator credits the balance
pub async fn credit_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreditRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.credit_quarters(request.count) {
        Ok(timer) => {
            info!("Credit endpoint called - {} quarter(s) credited", request.count);
            Ok(Json(ApiResponse::accepted(
                format!("Credited {} quarter(s)", request.count),
                timer,
            )))
        }
        Err(e) => {
            error!("Failed to credit quarters: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return the current timer status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.view() {
        Ok(timer) => timer,
        Err(e) => {
            error!("Failed to get timer view: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();
    let time_display = format_playtime(timer.time_remaining_seconds);

    Ok(Json(StatusResponse {
        timer,
        time_display,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
