//! HTTP client for the appointments API, used by the terminal calendar.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::api::public::appointments::{SaveAppointmentsRequest, SaveAppointmentsResponse};
use crate::appointments::AppointmentMap;
use crate::calendar::Persistence;

/// Servers answer `GET` either with `{"appointments": {...}}` or with
/// the bare document, depending on how they are deployed.
#[derive(Deserialize)]
#[serde(untagged)]
enum LoadResponse {
    Wrapped { appointments: AppointmentMap },
    Bare(AppointmentMap),
}

pub struct AppointmentsClient {
    client: Client,
    url: reqwest::Url,
}

impl AppointmentsClient {
    pub fn new(api_base_url: &str) -> Result<Self> {
        let url = reqwest::Url::parse(&format!(
            "{}/api/appointments",
            api_base_url.trim_end_matches('/')
        ))
        .with_context(|| format!("Invalid API URL '{}'", api_base_url))?;
        Ok(Self {
            client: Client::new(),
            url,
        })
    }
}

#[async_trait]
impl Persistence for AppointmentsClient {
    async fn load(&self) -> Result<AppointmentMap> {
        let resp: LoadResponse = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .context("Failed to reach the appointments API")?
            .error_for_status()?
            .json()
            .await
            .context("Unexpected appointments payload")?;

        let appointments = match resp {
            LoadResponse::Wrapped { appointments } => appointments,
            LoadResponse::Bare(appointments) => appointments,
        };
        tracing::info!("Loaded {} appointments", appointments.len());
        Ok(appointments)
    }

    async fn save(&self, appointments: &AppointmentMap) -> Result<()> {
        let resp: SaveAppointmentsResponse = self
            .client
            .post(self.url.clone())
            .json(&SaveAppointmentsRequest::new(appointments.clone()))
            .send()
            .await
            .context("Failed to reach the appointments API")?
            .error_for_status()?
            .json()
            .await
            .context("Unexpected save response")?;

        if !resp.success {
            bail!(
                "Appointments were not saved: {}",
                resp.message.as_deref().unwrap_or("no reason given")
            );
        }
        tracing::info!("Saved {} appointments", appointments.len());
        Ok(())
    }
}
