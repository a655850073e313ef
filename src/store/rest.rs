//! Client for hosted Redis-compatible stores that speak the REST
//! command protocol: each command is POSTed to the base URL as a JSON
//! array (`["SET", "key", "value"]`) with a bearer token, and the reply
//! is `{"result": ...}` or `{"error": "..."}`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{KvBackend, StoreError};

#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: Value,
    error: Option<String>,
}

pub struct RestKvBackend {
    client: Client,
    url: reqwest::Url,
    token: String,
}

impl RestKvBackend {
    pub fn new(url: &str, token: &str) -> Result<Self> {
        let url = reqwest::Url::parse(url)
            .with_context(|| format!("Invalid KV REST URL '{}'", url))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build KV REST client")?;
        Ok(Self {
            client,
            url,
            token: token.to_string(),
        })
    }

    async fn command(&self, args: &[&str]) -> Result<Value, StoreError> {
        let resp = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("{} request failed: {}", args[0], e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| StoreError::Unavailable(format!("{} response unreadable: {}", args[0], e)))?;
        let parsed = serde_json::from_str::<CommandResponse>(&body);

        match parsed {
            Ok(CommandResponse {
                error: Some(error), ..
            }) => Err(StoreError::Unavailable(format!(
                "{} failed with {}: {}",
                args[0], status, error
            ))),
            Ok(CommandResponse { result, .. }) if status.is_success() => Ok(result),
            _ => Err(StoreError::Unavailable(format!(
                "{} failed with {}",
                args[0], status
            ))),
        }
    }
}

#[async_trait]
impl KvBackend for RestKvBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.command(&["GET", key]).await? {
            Value::Null => Ok(None),
            Value::String(value) => Ok(Some(value)),
            // Some clients store JSON values without a string wrapper
            other => Ok(Some(other.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        match ttl {
            Some(ttl) => {
                let secs = ttl.as_secs().max(1).to_string();
                self.command(&["SET", key, value, "EX", secs.as_str()]).await?
            }
            None => self.command(&["SET", key, value]).await?,
        };
        Ok(())
    }
}
