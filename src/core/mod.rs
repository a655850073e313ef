mod config;

pub use config::{AppConfig, BackendKind, ResponseShape, api_url};
