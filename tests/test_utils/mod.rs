//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{Router, body::Body};

use practice_calendar::api::AppState;
use practice_calendar::api::app;
use practice_calendar::core::{AppConfig, ResponseShape};
use practice_calendar::store::{AppointmentStore, KvBackend, MemoryBackend, StoreError};

/// A backend that refuses every request, like a KV service with a
/// revoked token.
pub struct FailingBackend;

#[async_trait]
impl KvBackend for FailingBackend {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable(String::from("WRONGPASS invalid token")))
    }

    async fn set(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(String::from("WRONGPASS invalid token")))
    }
}

/// An in-memory store the caller can inspect after requests.
pub fn test_store() -> AppointmentStore {
    AppointmentStore::new(Arc::new(MemoryBackend::default()), "appointments")
}

pub fn app_with(store: AppointmentStore, config: AppConfig) -> Router {
    app(Arc::new(AppState::new(store, config)))
}

/// Creates a test application router backed by an in-memory store.
pub fn test_app() -> Router {
    app_with(test_store(), AppConfig::default())
}

/// Application whose store is always unavailable.
pub fn failing_app() -> Router {
    let store = AppointmentStore::new(Arc::new(FailingBackend), "appointments");
    app_with(store, AppConfig::default())
}

/// Application that answers `GET` with the bare document.
pub fn bare_app(store: AppointmentStore) -> Router {
    let config = AppConfig {
        response_shape: ResponseShape::Bare,
        ..AppConfig::default()
    };
    app_with(store, config)
}

pub fn app_without_cors() -> Router {
    let config = AppConfig {
        cors_enabled: false,
        ..AppConfig::default()
    };
    app_with(test_store(), config)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
