use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::Value as JsonValue;

use super::datasource::FieldSource;

pub struct MetapoolDataSource {
    client: Arc<Client>,
    url: String,
}

impl MetapoolDataSource {
    pub fn new(client: Arc<Client>, url: String) -> MetapoolDataSource {
        MetapoolDataSource { client, url }
    }
}

#[async_trait]
impl FieldSource for MetapoolDataSource {
    async fn fetch_object(&self) -> Result<JsonValue> {
        info!("Querying Metapool stats");
        let resp_payload = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Metapool: request failed")?;
        let status = resp_payload.status();
        if !status.is_success() {
            return Err(anyhow!("Metapool: HTTP {}", status));
        }
        let response: JsonValue = resp_payload
            .json()
            .await
            .context("Metapool: invalid JSON")?;
        debug!("Metapool: {}", response);
        Ok(response)
    }
}
