//! Router for the appointments API (the whole calendar document)

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::SharedState;
use crate::core::ResponseShape;

/// Return every stored appointment
async fn load_appointments(State(state): State<SharedState>) -> Result<Response, ApiError> {
    tracing::info!("Loading appointments");
    let appointments = state.store.load().await?;

    let resp = match state.config.response_shape {
        ResponseShape::Wrapped => {
            Json(public::AppointmentsResponse { appointments }).into_response()
        }
        ResponseShape::Bare => Json(appointments).into_response(),
    };
    Ok(resp)
}

/// Replace the stored appointments with the request's document
async fn save_appointments(
    State(state): State<SharedState>,
    payload: Result<Json<public::SaveAppointmentsRequest>, JsonRejection>,
) -> Result<Json<public::SaveAppointmentsResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let appointments = request.validate()?;

    tracing::info!("Saving {} appointments", appointments.len());
    state.store.save(&appointments).await?;

    Ok(Json(public::SaveAppointmentsResponse {
        success: true,
        message: Some(String::from("Appointments saved")),
    }))
}

/// Plain `OPTIONS` requests. Real preflights are answered by the CORS
/// layer before they get here.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_supported(State(state): State<SharedState>) -> ApiError {
    if state.config.cors_enabled {
        ApiError::MethodNotSupported("GET, POST, OPTIONS")
    } else {
        ApiError::MethodNotSupported("GET, POST")
    }
}

/// Create the appointments router
pub fn router(cors_enabled: bool) -> Router<SharedState> {
    let mut route: MethodRouter<SharedState> = get(load_appointments).post(save_appointments);
    if cors_enabled {
        route = route.options(preflight);
    }
    Router::new().route("/", route.fallback(method_not_supported))
}
