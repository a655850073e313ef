//! Public types for the appointments API
use serde::{Deserialize, Serialize};

use crate::api::public::ApiError;
use crate::appointments::AppointmentMap;

#[derive(Serialize, Deserialize)]
pub struct AppointmentsResponse {
    pub appointments: AppointmentMap,
}

/// Body of `POST /api/appointments`. The field is optional here so a
/// missing document is reported as a bad request rather than a
/// deserialization failure.
#[derive(Serialize, Deserialize)]
pub struct SaveAppointmentsRequest {
    pub appointments: Option<AppointmentMap>,
}

impl SaveAppointmentsRequest {
    pub fn new(appointments: AppointmentMap) -> Self {
        Self {
            appointments: Some(appointments),
        }
    }

    /// The document to store, once every appointment has both names.
    pub fn validate(self) -> Result<AppointmentMap, ApiError> {
        let appointments = self.appointments.ok_or_else(|| {
            ApiError::InvalidRequest(String::from("missing field `appointments`"))
        })?;
        for (key, appt) in &appointments {
            appt.validate()
                .map_err(|e| ApiError::InvalidRequest(format!("slot {}: {}", key, e)))?;
        }
        Ok(appointments)
    }
}

/// `{"success": true}` is a complete reply; `message` is extra detail
/// this server adds.
#[derive(Serialize, Deserialize)]
pub struct SaveAppointmentsResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
