use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::Value as JsonValue;

use super::datasource::FieldSource;

/// Price ticker whose response is an object keyed by currency pair.
pub struct TickerDataSource {
    client: Arc<Client>,
    url: String,
    pair: String,
}

impl TickerDataSource {
    pub fn new(client: Arc<Client>, url: String, pair: String) -> TickerDataSource {
        TickerDataSource { client, url, pair }
    }
}

#[async_trait]
impl FieldSource for TickerDataSource {
    async fn fetch_object(&self) -> Result<JsonValue> {
        info!("Querying ticker {}", &self.pair);
        let resp_payload = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Ticker: request failed")?;
        let status = resp_payload.status();
        if !status.is_success() {
            return Err(anyhow!("Ticker: HTTP {}", status));
        }
        let mut response: JsonValue = resp_payload
            .json()
            .await
            .context("Ticker: invalid JSON")?;
        debug!("Ticker: {}", response);
        Ok(response
            .get_mut(&self.pair)
            .map(JsonValue::take)
            .unwrap_or(JsonValue::Null))
    }
}
