//! Thin HTTP client for the running service.

use anyhow::{bail, Context, Result};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::{Config, ServerConfig};

pub struct ServiceClient {
    base_url: String,
    client: reqwest::Client,
}

impl ServiceClient {
    pub fn new(port: u16) -> Self {
        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
        }
    }

    /// Uses the configured port, or the default one if the config is unreadable.
    pub fn from_config() -> Self {
        let port = Config::load()
            .map(|c| c.server.port)
            .unwrap_or_else(|_| ServerConfig::default().port);
        Self::new(port)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.client.get(self.url(path)))
            .await?
            .json()
            .await
            .context("Unexpected response from gavel service")
    }

    pub async fn get_text(&self, path: &str) -> Result<String> {
        Ok(self.send(self.client.get(self.url(path))).await?.text().await?)
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.client.post(self.url(path)))
            .await?
            .json()
            .await
            .context("Unexpected response from gavel service")
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(self.client.post(self.url(path)).json(body))
            .await?
            .json()
            .await
            .context("Unexpected response from gavel service")
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .context("Failed to connect to gavel service. Is it running?")?;

        let status = response.status();
        if !status.is_success() {
            let json: Value = response.json().await.unwrap_or(Value::Null);
            bail!(
                "{}",
                json.get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error"))
            );
        }

        Ok(response)
    }
}
