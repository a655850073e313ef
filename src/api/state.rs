use std::sync::Arc;

use crate::core::AppConfig;
use crate::store::AppointmentStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    // Handle to the single appointment document
    pub store: AppointmentStore,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: AppointmentStore, config: AppConfig) -> Self {
        Self { store, config }
    }
}
