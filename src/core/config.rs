use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

/// One year, the expiry the calendar has always written its document with.
const DEFAULT_TTL_SECS: u64 = 60 * 60 * 24 * 365;
const DEFAULT_STORE_KEY: &str = "appointments";
const DEFAULT_API_URL: &str = "http://127.0.0.1:2222";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Rest,
    Memory,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rest" => Ok(BackendKind::Rest),
            "memory" => Ok(BackendKind::Memory),
            other => Err(anyhow!("Unknown store backend '{}'", other)),
        }
    }
}

/// Shape of a successful `GET /appointments` body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{"appointments": {...}}`
    Wrapped,
    /// `{...}`
    Bare,
}

impl FromStr for ResponseShape {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "wrapped" => Ok(ResponseShape::Wrapped),
            "bare" => Ok(ResponseShape::Bare),
            other => Err(anyhow!("Unknown response shape '{}'", other)),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub kv_rest_api_url: String,
    pub kv_rest_api_token: String,
    pub store_key: String,
    pub tenant: Option<String>,
    pub ttl: Option<Duration>,
    pub cors_enabled: bool,
    pub response_shape: ResponseShape,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("backend", &self.backend)
            .field("kv_rest_api_url", &self.kv_rest_api_url)
            .field("kv_rest_api_token", &"<redacted>")
            .field("store_key", &self.store_key)
            .field("tenant", &self.tenant)
            .field("ttl", &self.ttl)
            .field("cors_enabled", &self.cors_enabled)
            .field("response_shape", &self.response_shape)
            .finish()
    }
}

impl Default for AppConfig {
    /// Local development settings: in-memory store, CORS on.
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            kv_rest_api_url: String::new(),
            kv_rest_api_token: String::new(),
            store_key: DEFAULT_STORE_KEY.to_string(),
            tenant: None,
            ttl: Some(Duration::from_secs(DEFAULT_TTL_SECS)),
            cors_enabled: true,
            response_shape: ResponseShape::Wrapped,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from any variable source. `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let backend = match lookup("CALENDAR_STORE_BACKEND") {
            Some(value) => value.parse().context("Invalid CALENDAR_STORE_BACKEND")?,
            None => BackendKind::Rest,
        };

        let (kv_rest_api_url, kv_rest_api_token) = match backend {
            BackendKind::Rest => (
                lookup("KV_REST_API_URL").context("Missing env var KV_REST_API_URL")?,
                lookup("KV_REST_API_TOKEN").context("Missing env var KV_REST_API_TOKEN")?,
            ),
            BackendKind::Memory => (
                lookup("KV_REST_API_URL").unwrap_or_default(),
                lookup("KV_REST_API_TOKEN").unwrap_or_default(),
            ),
        };

        let store_key = lookup("CALENDAR_STORE_KEY")
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_KEY.to_string());
        let tenant = lookup("CALENDAR_TENANT").filter(|tenant| !tenant.trim().is_empty());

        let ttl_secs = match lookup("CALENDAR_TTL_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid CALENDAR_TTL_SECS '{}'", value))?,
            None => DEFAULT_TTL_SECS,
        };
        let ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));

        let cors_enabled = match lookup("CALENDAR_CORS") {
            Some(value) => parse_bool(&value).context("Invalid CALENDAR_CORS")?,
            None => true,
        };

        let response_shape = match lookup("CALENDAR_RESPONSE_SHAPE") {
            Some(value) => value.parse().context("Invalid CALENDAR_RESPONSE_SHAPE")?,
            None => ResponseShape::Wrapped,
        };

        Ok(Self {
            backend,
            kv_rest_api_url,
            kv_rest_api_token,
            store_key,
            tenant,
            ttl,
            cors_enabled,
            response_shape,
        })
    }

    /// The key the appointment document is stored under. A tenant gets
    /// its own document next to the default one.
    pub fn document_key(&self) -> String {
        match &self.tenant {
            Some(tenant) => format!("{}:{}", self.store_key, tenant.trim()),
            None => self.store_key.clone(),
        }
    }
}

/// Base URL of the appointments API for the terminal commands. These
/// never touch the key-value store, so they skip `AppConfig`.
pub fn api_url() -> String {
    env::var("CALENDAR_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("Expected a boolean, got '{}'", other)),
    }
}
