//! Persistence for the appointment document.
//!
//! The whole calendar lives in one JSON document stored under a single
//! key of a key-value service. `AppointmentStore` owns the encoding of
//! that document and delegates raw reads and writes to a `KvBackend`,
//! so the hosted service can be swapped for an in-process map without
//! touching the HTTP layer.

mod memory;
mod rest;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::appointments::AppointmentMap;
use crate::core::{AppConfig, BackendKind};

pub use memory::MemoryBackend;
pub use rest::RestKvBackend;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport, authentication or backend failure.
    #[error("key-value store unavailable: {0}")]
    Unavailable(String),

    /// The stored value is not an appointment document.
    #[error("stored document is not an appointment map: {0}")]
    CorruptDocument(#[source] serde_json::Error),

    #[error("failed to encode appointments: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// The only two operations the calendar needs from a key-value service.
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct AppointmentStore {
    backend: Arc<dyn KvBackend>,
    key: String,
    ttl: Option<Duration>,
}

impl AppointmentStore {
    pub fn new(backend: Arc<dyn KvBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            ttl: None,
        }
    }

    /// Expire the document `ttl` after each save.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let backend: Arc<dyn KvBackend> = match config.backend {
            BackendKind::Rest => Arc::new(RestKvBackend::new(
                &config.kv_rest_api_url,
                &config.kv_rest_api_token,
            )?),
            BackendKind::Memory => Arc::new(MemoryBackend::default()),
        };
        tracing::info!(
            "Appointment store using {:?} backend with key '{}'",
            config.backend,
            config.document_key()
        );
        Ok(Self::new(backend, config.document_key()).with_ttl(config.ttl))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Fetch the whole document. A missing document is an empty calendar.
    pub async fn load(&self) -> Result<AppointmentMap, StoreError> {
        let raw = self.backend.get(&self.key).await?;
        let appointments = match raw {
            Some(raw) => decode_document(&raw)?,
            None => AppointmentMap::new(),
        };
        tracing::info!(
            "Loaded {} appointments from '{}'",
            appointments.len(),
            self.key
        );
        Ok(appointments)
    }

    /// Replace the whole document.
    pub async fn save(&self, appointments: &AppointmentMap) -> Result<(), StoreError> {
        let raw = serde_json::to_string(appointments).map_err(StoreError::Serialize)?;
        self.backend.set(&self.key, &raw, self.ttl).await?;
        tracing::info!(
            "Saved {} appointments to '{}'",
            appointments.len(),
            self.key
        );
        Ok(())
    }
}

/// Decode a stored document.
///
/// Besides a plain JSON object this accepts the shapes older writers
/// left behind: the object encoded a second time as a JSON string, an
/// empty array, `null` and an empty value.
fn decode_document(raw: &str) -> Result<AppointmentMap, StoreError> {
    if raw.trim().is_empty() {
        return Ok(AppointmentMap::new());
    }
    let value: Value = serde_json::from_str(raw).map_err(StoreError::CorruptDocument)?;
    match value {
        Value::Null => Ok(AppointmentMap::new()),
        Value::Array(items) if items.is_empty() => Ok(AppointmentMap::new()),
        Value::String(inner) => decode_document(&inner),
        other => serde_json::from_value(other).map_err(StoreError::CorruptDocument),
    }
}
